pub fn render_index(datasets: &[String]) -> String {
    let options = datasets
        .iter()
        .map(|name| {
            let name = escape_html(name);
            format!(r#"<option value="{name}">{name}</option>"#)
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    INDEX_HTML
        .replace("{{DATASET_OPTIONS}}", &options)
        .replace("{{DATASET_COUNT}}", &datasets.len().to_string())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Community Dashboard</title>
  <style>
    :root {
      --bg: #f4f6f8;
      --ink: #1f2933;
      --card: #ffffff;
      --bar: rgba(75, 192, 192, 0.8);
      --muted: #7b8794;
    }

    @media (prefers-color-scheme: dark) {
      :root {
        --bg: #141b2d;
        --ink: #e0e0e0;
        --card: #1f2a40;
        --bar: rgba(67, 229, 244, 0.8);
        --muted: #a3a3a3;
      }
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px;
    }

    .app {
      width: min(900px, 100%);
      background: var(--card);
      border-radius: 16px;
      padding: 28px;
      display: grid;
      gap: 20px;
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    button.active {
      font-weight: 600;
      outline: 2px solid var(--bar);
    }

    .row {
      display: grid;
      grid-template-columns: 110px 1fr 70px;
      gap: 10px;
      align-items: center;
      font-size: 0.9em;
    }

    .bar {
      height: 14px;
      background: var(--bar);
      border-radius: 6px;
    }

    .status {
      color: var(--muted);
      min-height: 1.2em;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Community Dashboard</h1>
      <p class="status">{{DATASET_COUNT}} dataset(s) available</p>
    </header>

    <section class="controls">
      <select id="dataset">
        {{DATASET_OPTIONS}}
      </select>
      <input id="date-column" placeholder="date column" />
      <input id="value-column" placeholder="value column" />
      <button data-granularity="daily" class="active">Daily</button>
      <button data-granularity="weekly">Weekly</button>
      <button data-granularity="monthly">Monthly</button>
      <button data-granularity="yearly">Yearly</button>
    </section>

    <p class="status" id="status"></p>
    <section id="chart"></section>
  </main>

  <script>
    const datasetSelect = document.getElementById('dataset');
    const dateColumn = document.getElementById('date-column');
    const valueColumn = document.getElementById('value-column');
    const statusEl = document.getElementById('status');
    const chart = document.getElementById('chart');
    const buttons = Array.from(document.querySelectorAll('button[data-granularity]'));
    let granularity = 'daily';
    let requestId = 0;

    const render = (series) => {
      chart.replaceChildren();
      const max = Math.max(1, ...series.values);
      series.labels.forEach((label, index) => {
        const row = document.createElement('div');
        row.className = 'row';
        const name = document.createElement('span');
        name.textContent = label;
        const bar = document.createElement('div');
        bar.className = 'bar';
        bar.style.width = `${(series.values[index] / max) * 100}%`;
        const value = document.createElement('span');
        value.textContent = series.values[index];
        row.append(name, bar, value);
        chart.append(row);
      });
      statusEl.textContent = series.skipped_rows > 0
        ? `${series.skipped_rows} row(s) skipped (unparseable date)`
        : '';
    };

    const load = async () => {
      const dataset = datasetSelect.value;
      if (!dataset) {
        statusEl.textContent = 'No datasets found';
        return;
      }
      const params = new URLSearchParams({ granularity });
      if (dateColumn.value) params.set('date_column', dateColumn.value);
      if (valueColumn.value) params.set('value_column', valueColumn.value);

      const id = ++requestId;
      const res = await fetch(`/api/series/${encodeURIComponent(dataset)}?${params}`);
      if (id !== requestId) {
        return;
      }
      if (!res.ok) {
        chart.replaceChildren();
        statusEl.textContent = await res.text();
        return;
      }
      render(await res.json());
    };

    buttons.forEach((button) => {
      button.addEventListener('click', () => {
        granularity = button.dataset.granularity;
        buttons.forEach((b) => b.classList.toggle('active', b === button));
        load().catch((err) => (statusEl.textContent = err.message));
      });
    });

    [datasetSelect, dateColumn, valueColumn].forEach((el) => {
      el.addEventListener('change', () => load().catch((err) => (statusEl.textContent = err.message)));
    });

    load().catch((err) => (statusEl.textContent = err.message));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lists_escaped_dataset_options() {
        let html = render_index(&["members".to_string(), "a<b".to_string()]);
        assert!(html.contains(r#"<option value="members">members</option>"#));
        assert!(html.contains("a&lt;b"));
        assert!(html.contains("2 dataset(s) available"));
        assert!(!html.contains("{{"));
    }
}
