use crate::format::format_currency;
use crate::models::{DashboardStats, Plan, SERVER_PRESETS, SaleRow};
use tera::{Context, Tera};

/// Renders the dashboard page. Every interpolated value is HTML-escaped.
pub fn render_index(query: &str, stats: &DashboardStats, rows: &[SaleRow]) -> Result<String, tera::Error> {
    let plans: Vec<&str> = Plan::ALL.iter().map(|plan| plan.label()).collect();

    let mut context = Context::new();
    context.insert("query", query);
    context.insert("current_count", &stats.current_count);
    context.insert("current_value", &format_currency(stats.current_value));
    context.insert("current_share", &format!("{:.0}", stats.current_share()));
    context.insert("expired_count", &stats.expired_count);
    context.insert("expired_value", &format_currency(stats.expired_value));
    context.insert("expired_share", &format!("{:.0}", stats.expired_share()));
    context.insert("total_count", &stats.sales_count);
    context.insert("total_value", &format_currency(stats.total_sales_value));
    context.insert("expiring", &stats.expiring_count);
    context.insert("new", &stats.new_count);
    context.insert("active", &stats.active_count);
    context.insert("inactive", &stats.inactive_count);
    context.insert("profit", &format_currency(stats.total_profit));
    context.insert("servers", &SERVER_PRESETS);
    context.insert("plans", &plans);
    context.insert("rows", rows);

    Tera::one_off(INDEX_HTML, &context, true)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>IPTV Flow</title>
  <style>
    :root {
      --bg: #020617;
      --panel: #0f172a;
      --line: #1e293b;
      --ink: #e2e8f0;
      --muted: #64748b;
      --accent: #6366f1;
      --ok: #34d399;
      --soon: #fbbf24;
      --expired: #fb7185;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      font-size: 13px;
    }

    header {
      background: var(--panel);
      border-bottom: 1px solid var(--line);
      padding: 12px 32px;
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    h1 {
      margin: 0;
      font-size: 1.1rem;
      font-style: italic;
      text-transform: uppercase;
      letter-spacing: -0.02em;
    }

    h1 span {
      color: var(--accent);
    }

    main {
      max-width: 1280px;
      margin: 0 auto;
      padding: 24px 32px 80px;
      display: grid;
      gap: 24px;
    }

    input, select {
      background: #1e293b;
      border: 1px solid #334155;
      color: var(--ink);
      border-radius: 8px;
      padding: 8px 10px;
    }

    button {
      border: 1px solid transparent;
      border-radius: 8px;
      padding: 6px 12px;
      background: var(--accent);
      color: white;
      font-weight: 700;
      cursor: pointer;
    }

    button.danger {
      background: transparent;
      color: var(--expired);
      border-color: rgba(251, 113, 133, 0.3);
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .card {
      background: var(--panel);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 16px;
      display: grid;
      gap: 8px;
    }

    .card .label {
      font-size: 10px;
      font-weight: 700;
      color: var(--muted);
      text-transform: uppercase;
      letter-spacing: 0.12em;
    }

    .card .value {
      font-size: 1.5rem;
      font-weight: 700;
    }

    .mini {
      display: flex;
      justify-content: space-between;
    }

    .bar {
      width: 100%;
      height: 4px;
      background: var(--line);
      border-radius: 999px;
      overflow: hidden;
    }

    td .bar {
      width: 80px;
      margin-top: 4px;
    }

    .fill {
      height: 100%;
    }

    .fill.current { background: var(--ok); }
    .fill.expiring_soon { background: var(--soon); }
    .fill.expired { background: var(--expired); }
    span.current { color: var(--ink); }
    span.expiring_soon { color: var(--soon); }
    span.expired { color: var(--expired); font-weight: 700; }
    .value.current { color: var(--ok); }
    .value.expired { color: var(--expired); }

    form.new-sale {
      background: var(--panel);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 16px;
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 10px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: var(--panel);
      border: 1px solid var(--line);
      border-radius: 12px;
      overflow: hidden;
    }

    th {
      text-align: left;
      font-size: 9px;
      color: var(--muted);
      text-transform: uppercase;
      letter-spacing: 0.12em;
      padding: 12px 16px;
    }

    td {
      padding: 12px 16px;
      border-top: 1px solid var(--line);
      vertical-align: middle;
    }

    td small {
      display: block;
      color: #475569;
      font-family: monospace;
      font-size: 9px;
    }

    td form {
      display: inline;
    }

    .center { text-align: center; }
    .right { text-align: right; }
    .empty { text-align: center; color: #475569; font-style: italic; padding: 48px; }

    .controls {
      display: flex;
      gap: 6px;
      align-items: center;
      justify-content: center;
    }

    .controls a {
      color: var(--ok);
      font-weight: 700;
      text-decoration: none;
    }

    .status.on {
      background: rgba(52, 211, 153, 0.1);
      color: var(--ok);
      border-color: rgba(52, 211, 153, 0.2);
    }

    .status.off {
      background: #1e293b;
      color: var(--muted);
      border-color: #334155;
    }
  </style>
</head>
<body>
  <header>
    <h1>IPTV Flow <span>PRO</span></h1>
    <form method="get" action="/">
      <input type="text" name="q" placeholder="BUSCAR CLIENTE..." value="{{ query }}" />
    </form>
  </header>

  <main>
    <section class="cards">
      <div class="card">
        <span class="label">Em dia | {{ current_count }}</span>
        <span class="value current">{{ current_value }}</span>
        <div class="bar"><div class="fill current" style="width: {{ current_share }}%"></div></div>
      </div>
      <div class="card">
        <span class="label">Vencidos | {{ expired_count }}</span>
        <span class="value expired">{{ expired_value }}</span>
        <div class="bar"><div class="fill expired" style="width: {{ expired_share }}%"></div></div>
      </div>
      <div class="card">
        <span class="label">Total | {{ total_count }}</span>
        <span class="value">{{ total_value }}</span>
        <span class="label">Vencendo em 5 dias: {{ expiring }}</span>
      </div>
      <div class="card">
        <div class="mini"><span class="label">Novos (7 dias)</span><strong>{{ new }}</strong></div>
        <div class="mini"><span class="label">Ativos</span><strong>{{ active }}</strong></div>
        <div class="mini"><span class="label">Inativos</span><strong>{{ inactive }}</strong></div>
        <div class="mini"><span class="label">Lucro</span><strong>{{ profit }}</strong></div>
      </div>
    </section>

    <form class="new-sale" method="post" action="/sales">
      <input name="clientName" placeholder="Nome completo" required />
      <input name="whatsapp" placeholder="WhatsApp" required />
      <input name="username" placeholder="Login" required />
      <input name="password" placeholder="Senha" />
      <select name="server">{% for server in servers %}<option>{{ server }}</option>{% endfor %}</select>
      <select name="plan">{% for plan in plans %}<option>{{ plan }}</option>{% endfor %}</select>
      <input name="purchaseDate" type="date" />
      <input name="value" type="number" step="0.01" value="35" />
      <input name="cost" type="number" step="0.01" value="10" />
      <button type="submit">Cadastrar</button>
    </form>

    <table>
      <thead>
        <tr>
          <th>Nome completo</th>
          <th>Login</th>
          <th>Servidor</th>
          <th>Plano</th>
          <th>Valor</th>
          <th>Vencimento</th>
          <th>Situação</th>
          <th>Controle</th>
        </tr>
      </thead>
      <tbody>
{% for row in rows %}
        <tr>
          <td><strong>{{ row.clientName }}</strong><small>{{ row.id }}</small></td>
          <td><code>{{ row.username }}</code></td>
          <td>{{ row.server }}</td>
          <td class="center">{{ row.plan }}</td>
          <td class="right">{{ row.valueLabel }}</td>
          <td><span class="{{ row.standing }}">{{ row.expiryLabel }}</span><div class="bar"><div class="fill {{ row.standing }}" style="width: {{ row.progress | round }}%"></div></div></td>
          <td class="center"><form method="post" action="/sales/{{ row.id }}/toggle"><button class="status {% if row.status == "Ativo" %}on{% else %}off{% endif %}">{{ row.status }}</button></form></td>
          <td class="controls">
            <a href="{{ row.notifyLink }}" target="_blank" rel="noreferrer">WhatsApp</a>
            <form method="post" action="/sales/{{ row.id }}/renew"><button>Renovar</button></form>
            <form method="post" action="/sales/{{ row.id }}/delete"><button class="danger">Excluir</button></form>
          </td>
        </tr>
{% else %}
        <tr><td colspan="8" class="empty">Nenhum registro encontrado.</td></tr>
{% endfor %}
      </tbody>
    </table>
  </main>
</body>
</html>
"#;
