use maud::{DOCTYPE, Markup, PreEscaped, html};

pub fn wrap_page(content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang = "en" {
            head {
                title { "Crossbar" }
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                link rel="stylesheet" href="/local/theme.css";
                style {
                    (PreEscaped(BASE_THEME))
                }
            }
        }

        noscript {
            h1 {
                "Please enable JavaScript!"
            }
        }

        header {
            div {
                h1 {
                    "Crossbar"
                }
            }
            div {
                a href="/" {
                    "Dashboard"
                }
            }
        }

        main {
            (content)
        }

        script {
            (PreEscaped(JS))
        }
    }
}

pub const JS: &str = r#"
    const ws = new WebSocket(`ws://${location.host}/ws`);

    ws.onopen = () => {
        console.log("WS Connected");
    };

    ws.onmessage = (event) => {
        const msg = JSON.parse(event.data);
        if (msg.header !== "states") {
            console.log("WS:", msg);
            return;
        }
        for (const patch of msg.body) {
            apply(patch);
        }
    };

    ws.onerror = (error) => {
        console.error("WS Error:", error);
    };

    ws.onclose = () => {
        console.error("WS Closed");
    };

    function apply(patch) {
        const el = document.getElementById(patch.id);
        if (!el) return;
        if (patch.options) {
            const shown = Array.from(el.options ?? []).map((o) => o.value);
            if (JSON.stringify(shown) !== JSON.stringify(patch.options)) {
                el.innerHTML = "";
                for (const name of patch.options) {
                    const o = document.createElement("option");
                    o.value = name;
                    o.textContent = name;
                    el.appendChild(o);
                }
            }
        }
        if (patch.value !== undefined) el.value = patch.value;
        if (patch.text !== undefined) el.textContent = patch.text;
    }

    function cardChanged(e, wid) {
        ws.send(JSON.stringify({ widget: wid, event: { detail: { value: e.target.value } } }));
    }

    function panelChanged(e, wid) {
        ws.send(JSON.stringify({ widget: wid, event: { target: { value: e.target.value } } }));
    }
"#;

pub const BASE_THEME: &str = r#"
    *, *:before, *:after {
        box-sizing: border-box;
        font-family: monospace;
    }

    body {
        margin: 0;
        padding: 0;
        color: white;
        background: #111;
    }

    header {
        width: 100%;
        background: #444;
        height: 42px;
        display: flex;
        justify-content: space-between;
        align-items: center;
        padding: 0 6%;
    }

    header h1 {
        margin: 0;
    }

    header a {
        text-decoration: none;
        color: white;
    }

    main {
        padding: 16px 6%;
    }

    .dashboard {
        display: flex;
        flex-wrap: wrap;
        gap: 16px;
    }

    .card {
        background: #222;
        border-radius: 8px;
        min-width: 280px;
    }

    .card-header {
        margin: 0;
        padding: 12px 16px 0;
    }

    .card-content {
        padding: 16px;
    }

    .input-selector {
        margin-bottom: 16px;
        display: flex;
        flex-direction: column;
        gap: 8px;
    }

    select {
        width: 100%;
        padding: 6px;
        background: #333;
        color: white;
        border: 1px solid #555;
        border-radius: 4px;
    }

    .status-info {
        display: flex;
        flex-direction: column;
        gap: 8px;
    }

    .status-row, .device-info {
        display: flex;
        justify-content: space-between;
        align-items: center;
    }

    .device-info {
        padding: 8px 0;
        border-top: 1px solid #333;
    }

    .label, .info-label {
        font-weight: 500;
        color: #aaa;
    }

    .value, .info-value {
        font-weight: 600;
        color: white;
    }

    .container {
        display: flex;
        flex-direction: column;
        gap: 16px;
        padding: 16px;
        background: #222;
        border-radius: 8px;
        max-width: 480px;
    }
"#;
