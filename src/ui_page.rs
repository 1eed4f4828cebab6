// ui_page.rs
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="cs">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>GeriApp</title>
<style>
  body { font-family: sans-serif; max-width: 720px; margin: 40px auto; text-align: center; }
  textarea { width: 100%; font-size: 1.1em; }
  button { margin: 10px 5px; padding: 8px 14px; font-size: 1em; }
  #image { margin-top: 20px; max-width: 100%; }
  #download {
    display: inline-block; margin-top: 10px; padding: 8px 14px;
    background-color: #007acc; color: white; text-decoration: none; border-radius: 5px;
  }
  .hidden { display: none !important; }
  #status { color: #b00020; }
</style>
</head>
<body>
<h1>GeriApp Chat + Obrázky</h1>
<textarea id="input" rows="4" placeholder="Zadej text nebo hlasem..."></textarea>
<br>
<button id="chat">💬 Zeptej se GPT</button>
<button id="generate">🖼️ Vygeneruj obrázek</button>

<p id="loading" class="hidden">Načítání...</p>
<p id="status" class="hidden"></p>
<p id="reply" class="hidden"><strong>Odpověď:</strong> <span id="reply-text"></span></p>
<div id="image-box" class="hidden">
  <img id="image" alt="Vygenerovaný obrázek">
  <br>
  <a id="download" download="vysledek.png">⬇️ Stáhnout obrázek</a>
</div>

<script>
  const input = document.getElementById("input");
  const buttons = [document.getElementById("chat"), document.getElementById("generate")];
  let sessionId = sessionStorage.getItem("geriapp-session");

  function show(id, visible) {
    document.getElementById(id).classList.toggle("hidden", !visible);
  }

  function render(view) {
    if (view.session_id) {
      sessionId = view.session_id;
      sessionStorage.setItem("geriapp-session", sessionId);
    }
    buttons.forEach((b) => (b.disabled = view.loading));
    show("loading", view.loading);
    document.getElementById("status").textContent = view.status || "";
    show("status", !!view.status);
    document.getElementById("reply-text").textContent = view.reply;
    show("reply", !!view.reply);
    document.getElementById("image").src = view.image_url || "";
    document.getElementById("download").href = view.image_url || "#";
    show("image-box", !!view.image_url);
  }

  async function submit(path, clear) {
    if (buttons[0].disabled) return;
    render({ loading: true, reply: clear === "reply" ? "" : document.getElementById("reply-text").textContent,
             image_url: clear === "image" ? "" : document.getElementById("image").getAttribute("src") });
    try {
      const res = await fetch(path, {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ question: input.value, session_id: sessionId }),
      });
      render(await res.json());
      if (res.status === 409) await poll();
    } catch (e) {
      render({ loading: false, reply: "", image_url: "", status: "Chyba: " + e });
    }
  }

  // Follows a flow started elsewhere (another tab, or before a reload) until it ends.
  async function poll() {
    while (sessionId) {
      const res = await fetch("/api/session/" + sessionId);
      if (res.status === 404) {
        sessionId = null;
        sessionStorage.removeItem("geriapp-session");
        render({ loading: false, reply: "", image_url: "" });
        return;
      }
      const view = await res.json();
      render(view);
      if (!view.loading) return;
      await new Promise((resolve) => setTimeout(resolve, 1000));
    }
  }

  document.getElementById("chat").onclick = () => submit("/api/chat", "image");
  document.getElementById("generate").onclick = () => submit("/api/image", "reply");
  input.addEventListener("keydown", (e) => {
    if (e.key === "Enter" && !e.shiftKey) {
      e.preventDefault();
      submit("/api/chat", "image");
    }
  });
  if (sessionId) {
    poll().catch((e) => render({ loading: false, reply: "", image_url: "", status: "Chyba: " + e }));
  }
</script>
</body>
</html>
"##;
