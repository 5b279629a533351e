use axum::{
    body::Bytes,
    http::header,
    response::{Html, IntoResponse},
};
use serde_json::json;

use crate::config::Config;
use crate::series::Metric;

/// Render the dashboard page for this deployment.
///
/// Done once when the router is built; the page itself holds no data and
/// pulls everything from `/data`.
#[must_use]
pub fn render(config: &Config) -> Bytes {
    let series: Vec<_> = config
        .metrics
        .averaged()
        .map(|m: &Metric| {
            json!({
                "key": m.key(),
                "label": m.field.label(),
            })
        })
        .collect();

    let page = DASHBOARD_TEMPLATE
        .replace(
            "__POLL_INTERVAL_MS__",
            &(config.poll_interval_seconds.saturating_mul(1000)).to_string(),
        )
        .replace("__SERIES__", &serde_json::Value::from(series).to_string());

    Bytes::from(page)
}

pub async fn serve(page: Bytes) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "public, max-age=60")], Html(page))
}

const DASHBOARD_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Reef AI pH and Temperature</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/uplot@1.6.31/dist/uPlot.min.css">
    <style>
        :root {
            --bg: #f8fafc;
            --surface: #ffffff;
            --border: #e2e8f0;
            --text: #1e293b;
            --muted: #64748b;
            --accent: #2563eb;
            --on: #10b981;
            --off: #94a3b8;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); }
        .container { max-width: 1200px; margin: 0 auto; padding: 1.5rem; }
        h1 { font-size: 1.25rem; font-weight: 600; margin-bottom: 1rem; }
        .latest {
            display: flex;
            flex-wrap: wrap;
            gap: 1rem;
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 0.5rem;
            padding: 1rem;
            margin-bottom: 1rem;
        }
        .stat { display: flex; flex-direction: column; min-width: 7rem; }
        .stat span:first-child { font-size: 0.75rem; color: var(--muted); }
        .stat span:last-child { font-size: 1.25rem; font-weight: 600; }
        .outlet.active { color: var(--on); }
        .outlet.inactive { color: var(--off); }
        #chart {
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 0.5rem;
            padding: 0.5rem;
            min-height: 300px;
        }
        #status { font-size: 0.875rem; color: var(--muted); margin-top: 0.5rem; }
        #status.error { color: #dc2626; }
    </style>
</head>
<body>
<div class="container">
    <h1>Reef AI</h1>
    <div class="latest">
        <div class="stat"><span>Latest pH</span><span id="latestph">--</span></div>
        <div class="stat"><span>Latest Temp</span><span id="latesttemp">--</span></div>
        <div class="stat"><span>Last Reading</span><span id="latestts">--</span></div>
        <div class="stat"><span>Outlet 1</span><span class="outlet" id="latestoutlet1">--</span></div>
        <div class="stat"><span>Outlet 2</span><span class="outlet" id="latestoutlet2">--</span></div>
        <div class="stat"><span>Outlet 3</span><span class="outlet" id="latestoutlet3">--</span></div>
        <div class="stat"><span>Outlet 4</span><span class="outlet" id="latestoutlet4">--</span></div>
    </div>
    <div id="chart"></div>
    <div id="status"></div>
</div>
<script src="https://cdn.jsdelivr.net/npm/uplot@1.6.31/dist/uPlot.iife.min.js"></script>
<script>
    const POLL_INTERVAL_MS = __POLL_INTERVAL_MS__;
    const SERIES = __SERIES__;
    const COLORS = ['#2563eb', '#ef4444', '#10b981', '#f59e0b', '#8b5cf6', '#0ea5e9'];

    let chart = null;

    function scaleFor(key) {
        if (key === 'phvalues') return 'ph';
        if (key === 'tempvalues') return 'temp';
        return 'outlet';
    }

    function buildChart() {
        const el = document.getElementById('chart');
        const opts = {
            width: el.clientWidth - 16,
            height: 320,
            scales: { x: { time: true } },
            series: [{}].concat(SERIES.map((s, i) => ({
                label: s.label,
                scale: scaleFor(s.key),
                stroke: COLORS[i % COLORS.length],
                width: 1.5,
                spanGaps: false,
            }))),
            axes: [
                {},
                { scale: 'ph', side: 1, label: 'pH' },
                { scale: 'temp', side: 3, label: 'temp' },
            ],
        };
        chart = new uPlot(opts, [[]].concat(SERIES.map(() => [])), el);
    }

    // Every series shares the same bucket times, so x comes from the first one.
    function toColumns(data) {
        const first = SERIES.map(s => data[s.key]).find(Array.isArray) || [];
        const xs = first.map(p => p[0] / 1000);
        const ys = SERIES.map(s => (data[s.key] || []).map(p => p[1]));
        return [xs].concat(ys);
    }

    function setText(id, value) {
        document.getElementById(id).textContent = value === null || value === undefined ? '--' : value;
    }

    function renderOutlet(n, value) {
        const el = document.getElementById('latestoutlet' + n);
        el.classList.remove('active', 'inactive');
        if (value === null || value === undefined) {
            el.textContent = '--';
            return;
        }
        const active = Number(value) > 0;
        el.textContent = active ? 'active' : 'inactive';
        el.classList.add(active ? 'active' : 'inactive');
    }

    function setStatus(text, isError) {
        const el = document.getElementById('status');
        el.textContent = text;
        el.classList.toggle('error', !!isError);
    }

    function render(data) {
        chart.setData(toColumns(data));
        setText('latestph', data.latestph);
        setText('latesttemp', data.latesttemp);
        setText('latestts', data.latestts);
        for (let n = 1; n <= 4; n++) renderOutlet(n, data['latestoutlet' + n]);
        setStatus('Updated ' + new Date().toLocaleTimeString(), false);
    }

    function renderEmpty() {
        chart.setData([[]].concat(SERIES.map(() => [])));
        setStatus('No readings recorded yet', false);
    }

    // Fixed delay: the next poll is only scheduled once this one has rendered.
    async function poll() {
        try {
            const res = await fetch('data', { cache: 'no-store' });
            const body = await res.json().catch(() => ({}));
            if (res.ok) {
                render(body);
            } else if (body.code === 'empty_store') {
                renderEmpty();
            } else {
                setStatus('Refresh failed: ' + (body.error || res.statusText), true);
            }
        } catch (err) {
            setStatus('Refresh failed: ' + err.message, true);
        } finally {
            setTimeout(poll, POLL_INTERVAL_MS);
        }
    }

    buildChart();
    poll();
</script>
</body>
</html>
"##;
