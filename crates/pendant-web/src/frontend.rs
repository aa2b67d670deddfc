//! Embedded single-page pendant UI.
//!
//! The whole page lives in one HTML constant with inline CSS and
//! JavaScript, so the server has no asset directory to ship.  It polls
//! `/getControlStatus`, renders the step sizes and shortcut buttons from
//! `/config`, and greys out jog controls whenever the server reports that
//! manual control is not allowed.

/// The complete pendant page as a static string.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1, user-scalable=no">
<title>UGS Pendant</title>
<style>
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
:root{
  --bg:#1b1f24;
  --panel:#252b33;
  --text:#e8e8e8;
  --muted:#8b949e;
  --accent:#2f81f7;
  --danger:#da3633;
  --ok:#3fb950;
  --warn:#d29922;
  --border:#30363d;
}
html,body{height:100%;font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,Helvetica,Arial,sans-serif;background:var(--bg);color:var(--text)}
body{display:flex;flex-direction:column;gap:12px;padding:12px;max-width:560px;margin:0 auto}
header{display:flex;justify-content:space-between;align-items:center}
header h1{font-size:18px;font-weight:600}
.state{font-family:"SF Mono",Monaco,Consolas,monospace;font-size:13px;padding:4px 10px;border-radius:12px;background:var(--panel);border:1px solid var(--border)}
.state.enabled{color:var(--ok);border-color:var(--ok)}
.state.disabled{color:var(--warn);border-color:var(--warn)}
.state.offline{color:var(--danger);border-color:var(--danger)}
section{background:var(--panel);border:1px solid var(--border);border-radius:10px;padding:12px}
section h2{font-size:13px;color:var(--muted);font-weight:500;margin-bottom:8px;text-transform:uppercase;letter-spacing:.5px}
.jog{display:grid;grid-template-columns:repeat(4,1fr);gap:8px}
button{font-size:16px;padding:14px 0;border-radius:8px;border:1px solid var(--border);background:#2d333b;color:var(--text);cursor:pointer;touch-action:manipulation}
button:active{background:var(--accent)}
button:disabled{opacity:.35;cursor:not-allowed}
.steps{display:flex;flex-wrap:wrap;gap:8px}
.steps label{display:flex;align-items:center;gap:4px;padding:8px 12px;border:1px solid var(--border);border-radius:8px;cursor:pointer}
.shortcuts{display:grid;grid-template-columns:repeat(auto-fill,minmax(140px,1fr));gap:8px}
.command{display:flex;gap:8px}
.command input{flex:1;padding:12px;border-radius:8px;border:1px solid var(--border);background:var(--bg);color:var(--text);font-size:16px;font-family:"SF Mono",Monaco,Consolas,monospace}
.command button{padding:12px 18px}
.log{font-family:"SF Mono",Monaco,Consolas,monospace;font-size:12px;color:var(--muted);min-height:1.5em}
.log.error{color:var(--danger)}
</style>
</head>
<body>
<header>
  <h1>UGS Pendant</h1>
  <span id="state" class="state offline">CONNECTING</span>
</header>

<section>
  <h2>Jog</h2>
  <div class="jog">
    <span></span><button class="manual" data-dir="0,1,0">Y+</button><span></span><button class="manual" data-dir="0,0,1">Z+</button>
    <button class="manual" data-dir="-1,0,0">X-</button><span></span><button class="manual" data-dir="1,0,0">X+</button><span></span>
    <span></span><button class="manual" data-dir="0,-1,0">Y-</button><span></span><button class="manual" data-dir="0,0,-1">Z-</button>
  </div>
</section>

<section>
  <h2>Step size</h2>
  <div id="steps" class="steps"></div>
</section>

<section>
  <h2>Shortcuts</h2>
  <div id="shortcuts" class="shortcuts"></div>
</section>

<section>
  <h2>Command</h2>
  <form id="command-form" class="command">
    <input id="command" autocomplete="off" autocapitalize="characters" placeholder="G0 X0 Y0">
    <button type="submit" class="manual">Send</button>
  </form>
</section>

<div id="log" class="log"></div>

<script>
(function () {
  "use strict";

  var stateEl = document.getElementById("state");
  var logEl = document.getElementById("log");

  function log(text, isError) {
    logEl.textContent = text;
    logEl.className = isError ? "log error" : "log";
  }

  function showStatus(status) {
    var enabled = !!status.manualControlEnabled;
    stateEl.textContent = status.state;
    stateEl.className = "state " + (enabled ? "enabled" : "disabled");
    document.querySelectorAll(".manual").forEach(function (el) {
      el.disabled = !enabled;
    });
  }

  function request(path) {
    return fetch(path, { cache: "no-store" }).then(function (resp) {
      return resp.text().then(function (body) {
        if (!resp.ok) { throw new Error(body || resp.statusText); }
        return body;
      });
    });
  }

  function sendGcode(text) {
    return request("/sendGcode?gCode=" + encodeURIComponent(text))
      .then(function () { log("sent " + text); poll(); })
      .catch(function (err) { log(err.message, true); });
  }

  function selectedStep() {
    var checked = document.querySelector("input[name=step]:checked");
    return checked ? checked.value : "1";
  }

  function jog(dir) {
    var d = dir.split(",");
    var query = "dirX=" + d[0] + "&dirY=" + d[1] + "&dirZ=" + d[2] +
      "&stepSize=" + encodeURIComponent(selectedStep());
    request("/adjustManualLocation?" + query)
      .then(poll)
      .catch(function (err) { log(err.message, true); });
  }

  function renderConfig(config) {
    var steps = document.getElementById("steps");
    steps.innerHTML = "";
    (config.stepSizeList || []).forEach(function (option) {
      var label = document.createElement("label");
      var input = document.createElement("input");
      input.type = "radio";
      input.name = "step";
      input.value = option.value;
      input.checked = !!option.selected;
      label.appendChild(input);
      label.appendChild(document.createTextNode(option.label));
      steps.appendChild(label);
    });

    var shortcuts = document.getElementById("shortcuts");
    shortcuts.innerHTML = "";
    (config.shortCutButtonList || []).forEach(function (button) {
      var el = document.createElement("button");
      el.textContent = button.label;
      el.addEventListener("click", function () { sendGcode(button.gCode); });
      shortcuts.appendChild(el);
    });
  }

  function poll() {
    request("/getControlStatus")
      .then(function (body) { showStatus(JSON.parse(body)); })
      .catch(function () {
        stateEl.textContent = "OFFLINE";
        stateEl.className = "state offline";
      });
  }

  document.querySelectorAll(".jog button").forEach(function (el) {
    el.addEventListener("click", function () { jog(el.getAttribute("data-dir")); });
  });

  document.getElementById("command-form").addEventListener("submit", function (ev) {
    ev.preventDefault();
    var input = document.getElementById("command");
    if (input.value) { sendGcode(input.value); input.value = ""; }
  });

  fetch("/config", { cache: "no-store" })
    .then(function (resp) { return resp.json(); })
    .then(renderConfig)
    .catch(function (err) { log("config: " + err.message, true); });

  poll();
  setInterval(poll, 1000);
})();
</script>
</body>
</html>
"##;
