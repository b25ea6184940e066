use axum::response::Html;

/// The single-page client. It drives the JSON API and follows the
/// reference model in [`crate::view::TodoView`]: one pending action per item,
/// settled actions dropped, rolled-back deletes reinserted in list order.
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>todo-board</title>
  <style>
    :root {
      color-scheme: light;
      font-family: "Inter", system-ui, -apple-system, sans-serif;
    }
    body {
      margin: 0;
      background: #f1f5f9;
      color: #0f172a;
    }
    .app {
      max-width: 480px;
      margin: 48px auto;
      background: #ffffff;
      border-radius: 16px;
      box-shadow: 0 20px 40px rgba(15, 23, 42, 0.08);
      padding: 28px;
    }
    h1 {
      margin: 0 0 20px;
      font-size: 26px;
      text-align: center;
    }
    form {
      display: flex;
      gap: 8px;
      margin-bottom: 20px;
    }
    input[type="text"] {
      flex: 1;
      padding: 10px 14px;
      border-radius: 10px;
      border: 1px solid #cbd5f5;
      font-size: 15px;
    }
    button {
      border: none;
      border-radius: 10px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: #2563eb;
      color: #ffffff;
    }
    .banner {
      display: none;
      justify-content: space-between;
      align-items: center;
      margin-bottom: 16px;
      padding: 10px 14px;
      border-radius: 10px;
      background: #fee2e2;
      color: #991b1b;
      font-size: 14px;
    }
    .banner.visible {
      display: flex;
    }
    .banner button {
      background: transparent;
      color: #991b1b;
      padding: 0 4px;
    }
    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }
    li {
      display: flex;
      align-items: center;
      gap: 10px;
      padding: 10px 14px;
      border-radius: 10px;
      background: #f8fafc;
      border: 1px solid #e2e8f0;
    }
    li.pending {
      opacity: 0.6;
    }
    li .title {
      flex: 1;
    }
    li.done .title {
      text-decoration: line-through;
      color: #94a3b8;
    }
    li button.delete {
      background: #fee2e2;
      color: #991b1b;
      padding: 6px 10px;
    }
    .empty {
      text-align: center;
      color: #64748b;
    }
  </style>
</head>
<body>
  <div class="app">
    <h1>todo-board</h1>
    <div class="banner" id="banner">
      <span id="banner-text"></span>
      <button type="button" id="banner-close" aria-label="dismiss">&times;</button>
    </div>
    <form id="create">
      <input type="text" id="title" placeholder="New todo" autocomplete="off" />
      <button type="submit">Add</button>
    </form>
    <p class="empty" id="loading">Loading&hellip;</p>
    <ul id="list"></ul>
  </div>
  <script>
    const state = { todos: [], loading: true, error: null, pending: new Map(), nextAction: 1 };

    async function call(method, path, body) {
      const init = { method, headers: {} };
      if (body !== undefined) {
        init.headers["content-type"] = "application/json";
        init.body = JSON.stringify(body);
      }
      const response = await fetch(path, init);
      const payload = await response.json().catch(() => ({}));
      if (!response.ok) {
        throw new Error(payload.error || `HTTP ${response.status}`);
      }
      return payload;
    }

    // Same order as the list endpoint: created_at desc, then id desc.
    function insertOrdered(todo) {
      const key = Date.parse(todo.created_at);
      const index = state.todos.findIndex((t) => {
        const at = Date.parse(t.created_at);
        return at < key || (at === key && t.id < todo.id);
      });
      state.todos.splice(index < 0 ? state.todos.length : index, 0, todo);
    }

    function track(undo) {
      const id = state.nextAction++;
      state.pending.set(id, undo);
      return id;
    }

    function commit(action, record) {
      const undo = state.pending.get(action);
      if (!undo) return;
      state.pending.delete(action);
      if (undo.kind === "create") {
        insertOrdered(record);
      } else if (undo.kind === "toggle") {
        state.todos = state.todos.map((t) => (t.id === record.id ? record : t));
      }
      render();
    }

    function rollback(action, error) {
      const undo = state.pending.get(action);
      if (!undo) return;
      state.pending.delete(action);
      console.error("todo action rolled back:", error);
      if (undo.kind === "create") {
        const input = document.getElementById("title");
        if (input.value === "") input.value = undo.input;
      } else if (undo.kind === "toggle") {
        state.todos = state.todos.map((t) => (t.id === undo.previous.id ? undo.previous : t));
      } else if (undo.kind === "delete") {
        insertOrdered(undo.todo);
      }
      state.error = error.message;
      render();
    }

    function isBusy(id) {
      for (const undo of state.pending.values()) {
        if (undo.kind === "toggle" && undo.previous.id === id) return true;
        if (undo.kind === "delete" && undo.todo.id === id) return true;
      }
      return false;
    }

    async function load() {
      state.loading = true;
      render();
      try {
        state.todos = await call("GET", "/api/todos");
      } catch (error) {
        console.error("loading todos failed:", error);
        state.todos = [];
        state.error = error.message;
      }
      state.loading = false;
      render();
    }

    async function create(event) {
      event.preventDefault();
      const input = document.getElementById("title");
      const title = input.value.trim();
      if (title === "") return;
      const action = track({ kind: "create", input: input.value });
      input.value = "";
      try {
        commit(action, await call("POST", "/api/todos", { title }));
      } catch (error) {
        rollback(action, error);
      }
    }

    async function toggle(id) {
      if (isBusy(id)) return;
      const index = state.todos.findIndex((t) => t.id === id);
      if (index < 0) return;
      const previous = state.todos[index];
      const is_done = !previous.is_done;
      state.todos[index] = { ...previous, is_done };
      const action = track({ kind: "toggle", previous });
      render();
      try {
        commit(action, await call("PATCH", `/api/todos/${id}/toggle`, { is_done }));
      } catch (error) {
        rollback(action, error);
      }
    }

    async function remove(id) {
      const index = state.todos.findIndex((t) => t.id === id);
      if (index < 0) return;
      if (isBusy(id)) return;
      const [todo] = state.todos.splice(index, 1);
      const action = track({ kind: "delete", todo });
      render();
      try {
        commit(action, await call("DELETE", `/api/todos/${id}`));
      } catch (error) {
        rollback(action, error);
      }
    }

    function render() {
      document.getElementById("loading").style.display = state.loading ? "block" : "none";
      const banner = document.getElementById("banner");
      banner.classList.toggle("visible", state.error !== null);
      document.getElementById("banner-text").textContent = state.error || "";

      const list = document.getElementById("list");
      list.replaceChildren();
      if (state.loading) return;
      if (state.todos.length === 0) {
        const empty = document.createElement("p");
        empty.className = "empty";
        empty.textContent = "Nothing to do yet.";
        list.appendChild(empty);
        return;
      }
      for (const todo of state.todos) {
        const item = document.createElement("li");
        if (todo.is_done) item.classList.add("done");
        const busy = isBusy(todo.id);
        if (busy) item.classList.add("pending");

        const box = document.createElement("input");
        box.type = "checkbox";
        box.checked = todo.is_done;
        box.disabled = busy;
        box.addEventListener("change", () => toggle(todo.id));

        const title = document.createElement("span");
        title.className = "title";
        title.textContent = todo.title;

        const del = document.createElement("button");
        del.type = "button";
        del.className = "delete";
        del.textContent = "Delete";
        del.disabled = busy;
        del.addEventListener("click", () => remove(todo.id));

        item.append(box, title, del);
        list.appendChild(item);
      }
    }

    document.getElementById("create").addEventListener("submit", create);
    document.getElementById("banner-close").addEventListener("click", () => {
      state.error = null;
      render();
    });
    load();
  </script>
</body>
</html>
"#;
