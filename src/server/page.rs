// src/server/page.rs
// Human-readable status page. The inline script re-renders the table from
// `/api/status` and keeps the button disabled for 30s after each check.
use crate::health::{AggregatedHealth, Outcome};
use chrono::SecondsFormat;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 48rem; color: #222; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: .5rem; border-bottom: 1px solid #ddd; }
.status { font-weight: 600; padding: .1rem .5rem; border-radius: .25rem; }
.status-ok { background: #d4edda; color: #155724; }
.status-error { background: #f8d7da; color: #721c24; }
footer { margin-top: 1rem; color: #666; font-size: .9rem; }
"#;

const SCRIPT: &str = r#"
let timerInterval = null;

function escapeHtml(text) {
    const div = document.createElement('div');
    div.textContent = text;
    return div.innerHTML;
}

function updateTable(services) {
    const tbody = document.getElementById('status-table-body');
    tbody.innerHTML = '';
    for (const name in services) {
        const { outcome, detail } = services[name];
        const cls = outcome === 'OK' ? 'status-ok' : 'status-error';
        const row = document.createElement('tr');
        row.innerHTML = `<td>${escapeHtml(name)}</td>` +
            `<td><span class="status ${cls}">${escapeHtml(outcome)}</span></td>` +
            `<td>${escapeHtml(detail)}</td>`;
        tbody.appendChild(row);
    }
}

function manageButtonState() {
    const button = document.getElementById('check-status-btn');
    const footer = document.getElementById('footer-time');
    button.disabled = true;
    if (timerInterval) clearInterval(timerInterval);
    timerInterval = setInterval(() => {
        const stamp = footer.getAttribute('data-timestamp');
        if (!stamp || (new Date() - new Date(stamp)) / 1000 > 30) {
            button.disabled = false;
            clearInterval(timerInterval);
        }
    }, 1000);
}

function checkStatus() {
    if (timerInterval) clearInterval(timerInterval);
    const button = document.getElementById('check-status-btn');
    const label = button.textContent;
    button.textContent = 'Checking...';
    button.disabled = true;
    fetch('/api/status')
        .then(response => {
            if (!response.ok) throw new Error(response.statusText);
            return response.json();
        })
        .then(data => {
            updateTable(data.services);
            const footer = document.getElementById('footer-time');
            footer.textContent = 'Last checked: ' + data.last_checked;
            footer.setAttribute('data-timestamp', data.timestamp);
            manageButtonState();
        })
        .catch(error => {
            console.error('Error fetching status:', error);
            document.getElementById('status-table-body').innerHTML =
                '<tr><td colspan="3" class="status-error">Failed to fetch status. Please try again.</td></tr>';
            button.disabled = false;
        })
        .finally(() => { button.textContent = label; });
}

document.getElementById('check-status-btn').addEventListener('click', checkStatus);
manageButtonState();
"#;

pub fn render_page(snapshot: &AggregatedHealth) -> String {
    let mut rows = String::new();
    for status in snapshot.statuses() {
        let class = match status.outcome() {
            Outcome::Ok => "status-ok",
            Outcome::Error => "status-error",
        };
        // Writing into a String cannot fail.
        let _ = write!(
            rows,
            "<tr><td>{}</td><td><span class=\"status {}\">{}</span></td><td>{}</td></tr>",
            escape_html(status.name()),
            class,
            status.outcome(),
            escape_html(status.detail()),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Service Status</title>
<style>{style}</style>
</head>
<body>
<h1>Service Status</h1>
<table>
<thead><tr><th>Service</th><th>Status</th><th>Details</th></tr></thead>
<tbody id="status-table-body">{rows}</tbody>
</table>
<button id="check-status-btn" type="button">Check status</button>
<footer id="footer-time" data-timestamp="{timestamp}">Last checked: {last_checked}</footer>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        rows = rows,
        timestamp = snapshot
            .checked_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        last_checked = snapshot.last_checked(),
        script = SCRIPT,
    )
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
            c => escaped.push(c),
        }
    }
    escaped
}
