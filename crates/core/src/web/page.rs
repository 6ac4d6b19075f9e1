use crate::catalog::{LanguageCatalog, DETECT_SENTINEL};
use crate::config::DetectMode;
use crate::notice::{Notice, NoticeLevel};
use crate::service::TranslationText;
use std::fmt::Write;

const TITLE: &str = "Azure AI Translator";
const CAPTION: &str = "Translate text using Azure AI Translator.";

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
textarea { width: 100%; height: 100px; }
.columns { display: flex; gap: 1rem; margin: 1rem 0; }
.columns label { flex: 1; }
select { width: 100%; }
.notice { padding: .5rem .75rem; margin: .5rem 0; border-radius: 4px; }
.notice:empty { display: none; }
.info { background: #e8f1fb; }
.warning { background: #fdf6e3; }
.error { background: #fdecea; }
"#;

// Posts every edit; the server drops all but the newest after its quiet period.
const DETECT_SCRIPT: &str = r#"
(() => {
  const text = document.getElementById('text');
  const source = document.getElementById('source');
  const status = document.getElementById('detect-status');
  let inflight = null;
  const show = (message, level) => {
    status.textContent = message || '';
    status.className = 'notice ' + (level || '');
  };
  text.addEventListener('input', async () => {
    if (inflight) inflight.abort();
    const controller = new AbortController();
    inflight = controller;
    try {
      const res = await fetch('/api/detect', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ text: text.value }),
        signal: controller.signal,
      });
      const data = await res.json();
      if (data.status === 'detected') {
        if ([...source.options].some(o => o.value === data.name)) source.value = data.name;
        show(data.message, 'info');
      } else if (data.status === 'empty') {
        show('', '');
      } else if (data.status === 'failed') {
        show(data.message, 'error');
      }
    } catch (e) {
      if (e.name !== 'AbortError') show('Language detection error: ' + e, 'error');
    }
  });
})();
"#;

/// Everything one render of the page needs.
pub struct PageView<'a> {
    pub catalog: &'a LanguageCatalog,
    pub mode: DetectMode,
    pub text: &'a str,
    pub source: Option<&'a str>,
    pub target: Option<&'a str>,
    pub translation: Option<&'a TranslationText>,
    pub notices: Vec<Notice>,
}

impl<'a> PageView<'a> {
    pub fn new(catalog: &'a LanguageCatalog, mode: DetectMode) -> Self {
        Self {
            catalog,
            mode,
            text: "",
            source: None,
            target: None,
            translation: None,
            notices: Vec::new(),
        }
    }

    pub fn selected_source(&self) -> Option<&'a str> {
        let choices = self.catalog.source_choices(self.mode);
        match self.source.filter(|s| choices.contains(s)) {
            Some(source) => Some(source),
            None => match self.mode {
                DetectMode::Auto => Some(DETECT_SENTINEL),
                DetectMode::Manual => self.catalog.default_source(),
            },
        }
    }

    pub fn selected_target(&self) -> Option<&'a str> {
        let choices = self.catalog.target_choices();
        self.target
            .filter(|t| choices.contains(t))
            .or_else(|| self.catalog.default_target())
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    }
}

fn render_select(out: &mut String, id: &str, label: &str, choices: &[&str], selected: Option<&str>) {
    let _ = write!(
        out,
        r#"<label>{label}<select id="{id}" name="{id}">"#,
        label = escape(label),
    );
    for choice in choices {
        let choice = escape(choice);
        let marker = if selected.map(escape).as_deref() == Some(choice.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(out, r#"<option value="{choice}"{marker}>{choice}</option>"#);
    }
    out.push_str("</select></label>");
}

pub fn render(view: &PageView<'_>) -> String {
    let mut out = String::with_capacity(4096);
    let _ = write!(
        out,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{TITLE}</title><style>{STYLE}</style></head><body>"
    );
    let _ = write!(out, "<h1>{TITLE}</h1><p>{CAPTION}</p>");

    for notice in &view.notices {
        let _ = write!(
            out,
            r#"<div class="notice {}">{}</div>"#,
            level_class(notice.level),
            escape(&notice.message)
        );
    }

    out.push_str(r#"<form method="post" action="/translate">"#);
    let _ = write!(
        out,
        r#"<label for="text">Enter text to translate:</label><textarea id="text" name="text">{}</textarea>"#,
        escape(view.text)
    );
    out.push_str(r#"<div id="detect-status" class="notice"></div><div class="columns">"#);
    render_select(
        &mut out,
        "source",
        "Source Language",
        &view.catalog.source_choices(view.mode),
        view.selected_source(),
    );
    render_select(
        &mut out,
        "target",
        "Target Language",
        &view.catalog.target_choices(),
        view.selected_target(),
    );
    out.push_str(r#"</div><button type="submit">Translate</button></form>"#);

    if let Some(translation) = view.translation {
        let _ = write!(
            out,
            r#"<h2>Translated Text:</h2><p id="translation">{}</p>"#,
            escape(translation.as_str())
        );
    }

    if view.mode == DetectMode::Auto {
        let _ = write!(out, "<script>{DETECT_SCRIPT}</script>");
    }
    out.push_str("</body></html>");
    out
}
