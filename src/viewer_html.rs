pub const HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>HTML Preview</title>
  <style>
    body {
      margin: 0;
      padding: 0;
      background-color: #2a2a2a;
      color: #e0e0e0;
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    }
    #header {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 10px 16px;
      background-color: #1e1e1e;
      border-bottom: 1px solid #444;
    }
    #title {
      font-size: 16px;
      font-weight: bold;
    }
    #filename {
      font-family: monospace;
      font-size: 13px;
      color: #8ac6ff;
    }
    #controls {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 20px;
      padding: 10px 16px;
      background-color: rgba(0, 0, 0, 0.4);
      border-bottom: 1px solid #444;
      font-size: 13px;
    }
    #controls label {
      display: flex;
      align-items: center;
      gap: 6px;
      cursor: pointer;
    }
    #controls input[type="range"] {
      width: 200px;
    }
    #height-value {
      font-family: monospace;
      min-width: 50px;
      color: #aaa;
    }
    #preview-container {
      padding: 16px;
    }
    #preview {
      width: 100%;
      height: 900px;
      border: 1px solid #555;
      border-radius: 4px;
      background-color: #ffffff;
    }
  </style>
</head>
<body>
  <div id="header">
    <span id="title">Preview:</span>
    <span id="filename"></span>
  </div>

  <div id="controls">
    <label>
      <input type="checkbox" id="inline-toggle" checked>
      Inline local assets
    </label>
    <label>
      Preview height (px)
      <input type="range" id="height-slider" min="500" max="2000" step="50" value="900">
      <span id="height-value">900</span>
    </label>
    <label>
      <input type="checkbox" id="scrolling-toggle" checked>
      Enable scrolling in preview
    </label>
  </div>

  <div id="preview-container">
    <iframe id="preview" sandbox="allow-scripts" scrolling="yes"></iframe>
  </div>

  <script>
    const inlineToggle = document.getElementById('inline-toggle');
    const heightSlider = document.getElementById('height-slider');
    const heightValue = document.getElementById('height-value');
    const scrollingToggle = document.getElementById('scrolling-toggle');
    const preview = document.getElementById('preview');

    function reloadPreview() {
      // Cache-busting timestamp: the server re-reads and re-inlines the
      // document on every request.
      preview.src = '/preview?inline=' + inlineToggle.checked + '&t=' + Date.now();
    }

    function applyHeight() {
      heightValue.textContent = heightSlider.value;
      preview.style.height = heightSlider.value + 'px';
    }

    function applyScrolling() {
      preview.setAttribute('scrolling', scrollingToggle.checked ? 'yes' : 'no');
      // The scrolling attribute only takes effect on reload
      reloadPreview();
    }

    inlineToggle.addEventListener('change', reloadPreview);
    heightSlider.addEventListener('input', applyHeight);
    scrollingToggle.addEventListener('change', applyScrolling);

    // Fetch server-side defaults, then do the initial load
    fetch('/api/config')
      .then((response) => response.json())
      .then((config) => {
        document.getElementById('filename').textContent = config.file_name;
        document.title = 'Preview: ' + config.file_name;
        inlineToggle.checked = config.inline;
        heightSlider.value = config.height;
        scrollingToggle.checked = config.scrolling;
        applyHeight();
        preview.setAttribute('scrolling', config.scrolling ? 'yes' : 'no');
        reloadPreview();
      })
      .catch((error) => {
        console.error('Failed to load config:', error);
        reloadPreview();
      });

    // WebSocket connection for live preview reload
    function connectWebSocket() {
      const protocol = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
      const ws = new WebSocket(protocol + '//' + window.location.host + '/ws');

      ws.onopen = () => {
        console.log('WebSocket connected - live preview reload enabled');
      };

      ws.onmessage = (event) => {
        try {
          const data = JSON.parse(event.data);
          if (data.type === 'changed') {
            console.log('File changed: ' + data.filename);
            reloadPreview();
          }
        } catch (error) {
          console.error('Bad WebSocket message:', error);
        }
      };

      ws.onerror = (error) => {
        console.error('WebSocket error:', error);
      };

      ws.onclose = () => {
        console.log('WebSocket disconnected - reconnecting in 2s...');
        setTimeout(connectWebSocket, 2000);
      };
    }

    connectWebSocket();
  </script>
</body>
</html>"#;
