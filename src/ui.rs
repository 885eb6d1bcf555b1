use crate::status::StatusConfig;

pub fn render_index(config: &StatusConfig) -> String {
    INDEX_HTML.replace("{{DEADLINE}}", &config.deadline.format("%H:%M").to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Reclaim</title>
  <style>
    :root {
      --cream: #fbf6ee;
      --burgundy: #5a1a2b;
      --champagne: #f7e7ce;
      --sage: #9caf88;
      --warning: #f4a261;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--cream);
      color: var(--burgundy);
      font-family: "Georgia", serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
      transition: background 2s ease, color 2s ease;
    }

    body.ended {
      background: var(--burgundy);
      color: var(--champagne);
    }

    .app {
      width: min(920px, 100%);
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 28px;
    }

    .card {
      background: rgba(255, 255, 255, 0.4);
      border-radius: 20px;
      padding: 22px;
      box-shadow: 0 18px 40px rgba(90, 26, 43, 0.12);
    }

    .orb {
      width: 220px;
      height: 220px;
      margin: 0 auto;
      border-radius: 50%;
      display: grid;
      place-items: center;
      font-size: 2.6rem;
      background: var(--champagne);
      transition: background 1s ease;
    }

    .orb.warning { background: linear-gradient(45deg, var(--warning), #f4a3a8); }
    .orb.critical { background: var(--burgundy); color: var(--champagne); }

    .clock { font-size: 3.4rem; margin: 0; }
    .streak { font-weight: bold; }

    .grid7 {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
      text-align: center;
    }

    .day { padding: 6px 0; border-radius: 50%; opacity: 0.35; }
    .day.done { background: var(--champagne); color: var(--burgundy); opacity: 1; }
    .day.today { outline: 1px solid currentColor; opacity: 1; }

    .routine { display: grid; grid-template-columns: 1fr 1fr; gap: 8px; }

    button {
      font: inherit;
      border: 1px solid rgba(90, 26, 43, 0.2);
      background: rgba(255, 255, 255, 0.5);
      border-radius: 10px;
      padding: 8px 12px;
      cursor: pointer;
    }

    button.picked { background: var(--sage); }
    button:disabled { opacity: 0.4; cursor: default; }

    textarea { width: 100%; height: 90px; font: inherit; }
  </style>
</head>
<body>
  <main class="app">
    <section class="card">
      <div id="orb" class="orb">100</div>
      <h2 id="title">Focus Time</h2>
      <p id="blurb"></p>
      <p class="streak">Streak: <span id="streak">0</span></p>
      <p>Deadline {{DEADLINE}}</p>
    </section>

    <section class="card">
      <p id="clock" class="clock">--:--</p>
      <button id="end-day">End Day</button>
    </section>

    <section class="card">
      <h3 id="month"></h3>
      <div id="calendar" class="grid7"></div>
    </section>

    <section class="card">
      <h3>Evening Ritual <small>(pick 2)</small></h3>
      <div id="routine" class="routine"></div>
    </section>

    <section class="card">
      <h3>Today</h3>
      <p>
        Hydration
        <button data-water="-1">-</button>
        <span id="water">0</span>
        <button data-water="1">+</button>
      </p>
      <p><button id="vitamins">Vitamins: not yet</button></p>
      <p>
        <button data-mood="good">Radiant</button>
        <button data-mood="meh">Steady</button>
        <button data-mood="bad">Drained</button>
      </p>
      <textarea id="journal" placeholder="Release your thoughts here..."></textarea>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    let catalog = [];
    let generation = null;
    let notifiedFor = null;

    async function api(path, body) {
      const init = body === undefined
        ? { method: "GET" }
        : { method: "POST", headers: { "Content-Type": "application/json" }, body: JSON.stringify(body) };
      const response = await fetch(path, init);
      if (!response.ok) {
        throw new Error(await response.text());
      }
      return response.json();
    }

    function renderHabits(habits) {
      $("water").textContent = habits.water;
      $("vitamins").textContent = habits.vitamins ? "Vitamins: taken" : "Vitamins: not yet";
      $("vitamins").classList.toggle("picked", habits.vitamins);
      document.querySelectorAll("[data-mood]").forEach((button) => {
        button.classList.toggle("picked", button.dataset.mood === habits.mood);
      });
      if (document.activeElement !== $("journal")) {
        $("journal").value = habits.journal;
      }
      $("routine").replaceChildren(...catalog.map((item) => {
        const button = document.createElement("button");
        button.textContent = item;
        button.classList.toggle("picked", habits.routine.includes(item));
        button.onclick = () => api("/api/habits/routine", { item }).then(renderHabits);
        return button;
      }));
    }

    function renderCalendar(calendar) {
      $("month").textContent = calendar.month;
      const cells = [];
      for (let i = 0; i < calendar.leading_blanks; i++) {
        cells.push(document.createElement("div"));
      }
      for (const day of calendar.days) {
        const cell = document.createElement("div");
        cell.className = "day" + (day.completed ? " done" : "") + (day.today ? " today" : "");
        cell.textContent = day.day;
        cells.push(cell);
      }
      $("calendar").replaceChildren(...cells);
    }

    async function refreshStatus() {
      const status = await api("/api/status");
      $("clock").textContent = status.time.slice(11, 16);
      $("orb").textContent = status.health;
      $("orb").className = "orb " + status.phase;
      $("title").textContent = status.title;
      $("blurb").textContent = status.blurb;
      $("end-day").disabled = !status.session_active;
      $("end-day").textContent = status.session_active ? "End Day" : "Session Ended";
      document.body.classList.toggle("ended", !status.session_active);

      if (status.reminder && notifiedFor !== status.reminder.date && "Notification" in window) {
        notifiedFor = status.reminder.date;
        if (Notification.permission === "granted") {
          new Notification(status.reminder.title, { body: status.reminder.body });
        }
      }
    }

    async function refreshSummary() {
      const summary = await api("/api/summary");
      $("streak").textContent = summary.streak;
      if (summary.reset_generation !== generation) {
        generation = summary.reset_generation;
        renderHabits(await api("/api/habits"));
      }
      renderCalendar(await api("/api/calendar"));
    }

    document.querySelectorAll("[data-water]").forEach((button) => {
      button.onclick = () => api("/api/habits/water", { delta: Number(button.dataset.water) }).then(renderHabits);
    });
    document.querySelectorAll("[data-mood]").forEach((button) => {
      button.onclick = () => api("/api/habits/mood", { mood: button.dataset.mood }).then(renderHabits);
    });
    $("vitamins").onclick = () => api("/api/habits/vitamins", {}).then(renderHabits);
    $("journal").onchange = () => api("/api/habits/journal", { text: $("journal").value }).then(renderHabits);
    $("end-day").onclick = async () => {
      await api("/api/end-day", {});
      await refreshSummary();
      await refreshStatus();
    };

    if ("Notification" in window && Notification.permission === "default") {
      Notification.requestPermission();
    }

    (async () => {
      catalog = await api("/api/routine/catalog");
      await refreshSummary();
      await refreshStatus();
      setInterval(refreshStatus, 1000);
      setInterval(refreshSummary, 30000);
    })();
  </script>
</body>
</html>
"#;
