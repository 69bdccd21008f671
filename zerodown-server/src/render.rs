//! Server-side HTML for the dashboard page and its HTMX fragments.

use zerodown_core::models::{ChatMessage, Role, TicketView};
use zerodown_core::{Dashboard, Transcript};

pub const EMPTY_ALERTS: &str = "System Healthy. No active failure tickets.";
pub const REPAIR_BUTTON_LABEL: &str = "Start Repair";
const STATUS_LABELS: [&str; 4] = [
    "Ready to assist",
    "Monitoring Sensors",
    "Checking Anomalies",
    "Awaiting Command",
];

/// Runs before HTMX sends the chat form: shows the user's bubble right away
/// and cancels blank submissions. `textContent` keeps the text escaped.
const OPTIMISTIC_USER_BUBBLE: &str = "var m = this.elements.message.value; \
if (!m.trim()) { event.preventDefault(); return; } \
var b = document.createElement('div'); \
b.className = 'bubble bubble-user'; \
b.textContent = m; \
document.getElementById('chat-messages').appendChild(b);";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f9fafb; color: #111827; }
main { min-height: 100vh; padding: 1.5rem; }
.brand { font-size: 1.5rem; font-weight: 700; margin: 1rem 0 2rem; }
.brand .ai { background: linear-gradient(90deg, #ff0080, #7928ca, #0070f3, #38bdf8); -webkit-background-clip: text; background-clip: text; color: transparent; }
.layout { display: grid; grid-template-columns: 2fr 1fr; gap: 1.5rem; }
@media (max-width: 1024px) { .layout { grid-template-columns: 1fr; } }
h2 { font-size: 1.125rem; font-weight: 600; }
.alerts { display: flex; flex-direction: column; gap: 0.75rem; }
.empty-state { color: #6b7280; font-style: italic; padding: 1rem; background: #fff; border: 1px solid #e5e7eb; border-radius: 0.5rem; text-align: center; }
.alert { border-radius: 0.5rem; border: 1px solid; padding: 1rem; background: #fff; }
.alert-warning { border-color: #fbbf24; background: #fffbeb; }
.alert-critical { border-color: #f97316; background: #fff7ed; }
.alert-fatal { border-color: #dc2626; background: #fef2f2; }
.alert-title { font-weight: 600; display: flex; justify-content: space-between; }
.alert-variant { text-transform: uppercase; font-size: 0.75rem; }
.alert-action { margin-top: 0.5rem; }
.chat { height: 600px; display: flex; flex-direction: column; }
.chat-panel { flex: 1; background: #fff; border: 1px solid #e5e7eb; border-radius: 0.75rem; padding: 1rem; display: flex; flex-direction: column; overflow: hidden; }
#chat-messages { flex: 1; overflow-y: auto; display: flex; flex-direction: column; gap: 0.5rem; }
.chat-empty { color: #9ca3af; text-align: center; }
.chat-empty:not(:only-child) { display: none; }
.bubble { max-width: 85%; padding: 0.5rem 0.75rem; border-radius: 0.75rem; white-space: pre-wrap; }
.bubble-user { align-self: flex-end; background: #111827; color: #fff; }
.bubble-assistant { align-self: flex-start; background: #f3f4f6; }
.chat-form { display: flex; gap: 0.5rem; margin-top: 0.75rem; }
.chat-form input { flex: 1; padding: 0.5rem; border: 1px solid #d1d5db; border-radius: 0.5rem; }
.htmx-indicator { display: none; color: #6b7280; font-size: 0.875rem; }
.htmx-request.htmx-indicator, .htmx-request .htmx-indicator { display: block; }
.text-loop { color: #6b7280; font-size: 0.875rem; font-weight: 400; display: inline-grid; }
.text-loop span { grid-area: 1 / 1; opacity: 0; animation: loop 8s infinite; }
.text-loop span:nth-child(2) { animation-delay: 2s; }
.text-loop span:nth-child(3) { animation-delay: 4s; }
.text-loop span:nth-child(4) { animation-delay: 6s; }
@keyframes loop { 0%, 20% { opacity: 1; } 25%, 100% { opacity: 0; } }
"#;

/// Escape text for HTML element content and quoted attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn page(dashboard: &Dashboard) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>0down.AI</title>
    <script src="https://unpkg.com/htmx.org@1.9.12"></script>
    <style>{style}</style>
</head>
<body>
<main>
    {header}
    <div class="layout">
        <section>
            <h2>Recommended Actions</h2>
            {alerts}
        </section>
        <section class="chat">
            {chat}
        </section>
    </div>
</main>
</body>
</html>"##,
        style = STYLE,
        header = header(),
        alerts = alert_list(&dashboard.alerts),
        chat = chat_widget(&dashboard.transcript),
    )
}

pub fn header() -> String {
    r#"<header><h1 class="brand">0down.<span class="ai">AI</span></h1></header>"#.to_string()
}

pub fn alert_list(alerts: &[TicketView]) -> String {
    if alerts.is_empty() {
        return format!(
            r#"<div class="alerts"><p class="empty-state">{}</p></div>"#,
            EMPTY_ALERTS
        );
    }

    let cards: String = alerts.iter().map(alert_card).collect();
    format!(r#"<div class="alerts">{}</div>"#, cards)
}

pub fn alert_card(alert: &TicketView) -> String {
    format!(
        r#"<article class="alert alert-{variant}" data-ticket-id="{id}">
    <div class="alert-title"><span>{name}</span><span class="alert-variant">{variant}</span></div>
    <p class="alert-description">{description}</p>
    <p class="alert-action"><strong>Action:</strong> {action}</p>
    <button type="button" class="alert-repair">{label}</button>
</article>"#,
        variant = alert.variant.as_str(),
        id = alert.id,
        name = html_escape(&alert.equipment_name),
        description = html_escape(&alert.description),
        action = html_escape(&alert.action),
        label = REPAIR_BUTTON_LABEL,
    )
}

pub fn chat_widget(transcript: &Transcript) -> String {
    let labels: String = STATUS_LABELS
        .iter()
        .map(|l| format!("<span>{}</span>", l))
        .collect();

    format!(
        r##"<h2>Ask Copilot <span class="divider">|</span> <span class="text-loop">{labels}</span></h2>
<div class="chat-panel">
    <div id="chat-messages">
        <p class="chat-empty">Ask Copilot about an alert.</p>
        {messages}
    </div>
    <div id="chat-loading" class="htmx-indicator">Copilot is thinking…</div>
    <form class="chat-form" action="/chat" method="post"
          hx-post="/chat" hx-target="#chat-messages" hx-swap="beforeend"
          hx-indicator="#chat-loading" hx-disabled-elt="find button"
          hx-on::before-request="{optimistic}"
          hx-on::after-request="if (event.detail.successful) this.reset()">
        <input type="text" name="message" placeholder="Ask about an alert…" autocomplete="off">
        <button type="submit">Send</button>
    </form>
</div>"##,
        labels = labels,
        messages = messages(transcript.messages()),
        optimistic = OPTIMISTIC_USER_BUBBLE,
    )
}

/// Bubbles for `msgs`, in order.
pub fn messages(msgs: &[ChatMessage]) -> String {
    msgs.iter().map(message_bubble).collect()
}

/// Body of the HTMX chat fragment. The browser already shows the user bubble,
/// so only assistant messages are sent back.
pub fn reply_fragment(appended: &[ChatMessage]) -> String {
    appended
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(message_bubble)
        .collect()
}

pub fn message_bubble(msg: &ChatMessage) -> String {
    let time = msg
        .created_at
        .map(|t| format!(r#" title="{}""#, t.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();

    format!(
        r#"<div class="bubble bubble-{role}" data-message-id="{id}"{time}>{content}</div>"#,
        role = msg.role.as_str(),
        id = html_escape(&msg.id),
        time = time,
        content = html_escape(&msg.content),
    )
}
