use crate::clock::ClockDisplay;
use crate::models::{Dashboard, TaskCard};

pub enum Page {
    CaptureProfile,
    SetupTasks { preview: Vec<String> },
    Dashboard(Dashboard),
}

pub fn render_page(page: &Page, clock: &ClockDisplay) -> String {
    let (view, preview, welcome, day, cards) = match page {
        Page::CaptureProfile => (
            "capture_profile",
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ),
        Page::SetupTasks { preview } => (
            "setup_tasks",
            render_preview(preview),
            String::new(),
            String::new(),
            String::new(),
        ),
        Page::Dashboard(dashboard) => (
            "dashboard",
            String::new(),
            escape_html(&dashboard.welcome),
            escape_html(&dashboard.day_label),
            render_task_cards(&dashboard.tasks),
        ),
    };

    INDEX_HTML
        .replace("{{VIEW}}", view)
        .replace("{{PROFILE_HIDDEN}}", hidden_unless(view == "capture_profile"))
        .replace("{{SETUP_HIDDEN}}", hidden_unless(view == "setup_tasks"))
        .replace("{{DASHBOARD_HIDDEN}}", hidden_unless(view == "dashboard"))
        .replace("{{PREVIEW}}", &preview)
        .replace("{{WELCOME}}", &welcome)
        .replace("{{DAY}}", &day)
        .replace("{{CARDS}}", &cards)
        .replace("{{CLOCK}}", &escape_html(&clock.line()))
}

fn hidden_unless(visible: bool) -> &'static str {
    if visible { "" } else { "hidden" }
}

fn render_preview(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("<div>{}</div>", escape_html(line)))
        .collect()
}

pub fn render_task_cards(tasks: &[TaskCard]) -> String {
    tasks
        .iter()
        .map(|task| {
            format!(
                r#"<div class="task-card{completed}">
          <b>{name}</b><br>
          🕒 {start} — {end}<br>
          Status: {status}<br>
          <form method="post" action="/tasks/{index}/done" data-index="{index}" class="done-form">
            <button type="submit"{disabled}>Mark Done</button>
          </form>
        </div>"#,
                completed = if task.done { " task-completed" } else { "" },
                name = escape_html(&task.name),
                start = task.start,
                end = task.end,
                status = task.status_label,
                index = task.index,
                disabled = if task.done { " disabled" } else { "" },
            )
        })
        .collect()
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Quest</title>
  <style>
    :root {
      --bg-1: #eef3f8;
      --bg-2: #c9dcef;
      --ink: #22303c;
      --accent: #3a7d5c;
      --missed: #c63b2b;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(34, 48, 60, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f6f9fc 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    .clock {
      margin: 4px 0 0;
      color: #5f6b75;
    }

    form.box {
      display: grid;
      gap: 12px;
    }

    input {
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid rgba(34, 48, 60, 0.2);
      font-size: 1rem;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button:disabled {
      opacity: 0.5;
      cursor: default;
    }

    .task-cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .task-card {
      background: white;
      border-radius: 16px;
      padding: 16px;
      border: 1px solid rgba(34, 48, 60, 0.08);
      line-height: 1.6;
    }

    .task-card.task-completed {
      border-color: var(--accent);
    }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <main class="app" data-view="{{VIEW}}">
    <header>
      <h1>Habit Quest</h1>
      <p class="clock" id="live-clock">{{CLOCK}}</p>
    </header>

    <section id="user-box" {{PROFILE_HIDDEN}}>
      <h2>Your details</h2>
      <form class="box" id="profile-form" method="post" action="/profile">
        <input name="name" placeholder="Name" />
        <input name="age" placeholder="Age" />
        <input name="email" placeholder="Email" />
        <button type="submit">Continue</button>
      </form>
    </section>

    <section id="task-setup-box" {{SETUP_HIDDEN}}>
      <h2>Daily tasks</h2>
      <form class="box" id="task-form" method="post" action="/tasks/stage">
        <input name="name" placeholder="Task name" />
        <input name="start" type="time" />
        <input name="end" type="time" />
        <button type="submit">Add Task</button>
      </form>
      <div id="task-preview-list">{{PREVIEW}}</div>
      <form id="commit-form" method="post" action="/tasks/commit">
        <button type="submit">Start Tracking</button>
      </form>
    </section>

    <section id="dashboard-box" {{DASHBOARD_HIDDEN}}>
      <h2 id="welcome-text">{{WELCOME}}</h2>
      <p id="day-counter-text">{{DAY}}</p>
      <div class="task-cards" id="task-cards">{{CARDS}}</div>
    </section>
  </main>

  <script>
    const view = document.querySelector('.app').dataset.view;
    const clockEl = document.getElementById('live-clock');
    const welcomeEl = document.getElementById('welcome-text');
    const dayEl = document.getElementById('day-counter-text');
    const cardsEl = document.getElementById('task-cards');
    const previewEl = document.getElementById('task-preview-list');

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body || {})
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const fields = (form) => Object.fromEntries(new FormData(form).entries());

    const renderCards = (dashboard) => {
      welcomeEl.textContent = dashboard.welcome;
      dayEl.textContent = dashboard.day_label;
      cardsEl.replaceChildren(...dashboard.tasks.map((task) => {
        const card = document.createElement('div');
        card.className = task.done ? 'task-card task-completed' : 'task-card';
        const name = document.createElement('b');
        name.textContent = task.name;
        const button = document.createElement('button');
        button.type = 'button';
        button.textContent = 'Mark Done';
        button.disabled = task.done;
        button.addEventListener('click', () => markDone(task.index));
        card.append(
          name,
          document.createElement('br'),
          `🕒 ${task.start} — ${task.end}`,
          document.createElement('br'),
          `Status: ${task.status_label}`,
          document.createElement('br'),
          button
        );
        return card;
      }));
    };

    const markDone = (index) => {
      post(`/api/tasks/${index}/done`).then(renderCards).catch((err) => alert(err.message));
    };

    const refreshDashboard = async () => {
      const res = await fetch('/api/dashboard');
      if (res.ok) {
        renderCards(await res.json());
      }
    };

    const refreshClock = async () => {
      const res = await fetch('/api/clock');
      if (res.ok) {
        const clock = await res.json();
        clockEl.textContent = `${clock.weekday} | ${clock.date} | ${clock.time}`;
      }
    };

    const showNotifications = async () => {
      if (!('Notification' in window) || Notification.permission !== 'granted') {
        return;
      }
      const res = await fetch('/api/notifications');
      if (res.ok) {
        (await res.json()).forEach((item) => new Notification(item.title, { body: item.body }));
      }
    };

    document.getElementById('profile-form').addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/profile', fields(event.target))
        .then(() => location.reload())
        .catch((err) => alert(err.message));
    });

    document.getElementById('task-form').addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/tasks/stage', fields(event.target))
        .then((staged) => {
          previewEl.replaceChildren(...staged.preview.map((line) => {
            const row = document.createElement('div');
            row.textContent = line;
            return row;
          }));
          event.target.reset();
        })
        .catch((err) => alert(err.message));
    });

    document.getElementById('commit-form').addEventListener('submit', (event) => {
      event.preventDefault();
      post('/api/tasks/commit')
        .then(() => location.reload())
        .catch((err) => alert(err.message));
    });

    document.querySelectorAll('.done-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        markDone(Number(form.dataset.index));
      });
    });

    if ('Notification' in window) {
      Notification.requestPermission().then((state) =>
        post('/api/notifications/permission', { state }).catch(() => {})
      );
    }

    let ticks = 0;
    setInterval(() => {
      refreshClock().catch(() => {});
      ticks += 1;
      if (view === 'dashboard' && ticks % 30 === 0) {
        refreshDashboard().catch(() => {});
      }
      if (ticks % 10 === 0) {
        showNotifications().catch(() => {});
      }
    }, 1000);
  </script>
</body>
</html>
"#;
