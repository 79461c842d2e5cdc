//! Native browser management using `chromiumoxide`.
//!
//! Covers finding a usable browser executable (Brave → Chrome → Chromium,
//! cross-platform), launching a headless session with stability flags, and
//! rendering one results page: navigate under a timeout, let client-side code
//! settle, dismiss overlays, then capture the DOM.

use anyhow::{anyhow, Result};
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use rand::seq::IndexedRandom;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

// ── User-Agent pool ──────────────────────────────────────────────────────────

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Edge 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 Edg/132.0.0.0",
];

/// Returns a randomly-chosen realistic desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

// ── Browser executable discovery ─────────────────────────────────────────────

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `preferred` (config override), if it exists
/// 2. `CHROME_EXECUTABLE` env var
/// 3. PATH scan
/// 4. OS-specific well-known install paths
pub fn find_chrome_executable(preferred: Option<&str>) -> Option<String> {
    if let Some(p) = preferred {
        if Path::new(p).exists() {
            return Some(p.to_string());
        }
        warn!("Configured browser not found at {}, falling back to discovery", p);
    }

    if let Ok(p) = std::env::var(crate::core::config::ENV_CHROME_EXECUTABLE) {
        if Path::new(&p).exists() {
            return Some(p);
        }
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
            "brave-browser",
            "brave",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/local/bin/chromium",
            "/usr/bin/brave-browser",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
            r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

// ── Headless browser config builder ──────────────────────────────────────────

/// Build a `BrowserConfig` for headless operation.
///
/// `--no-sandbox` and `--disable-dev-shm-usage` keep Chromium alive in
/// containers and CI; the UA is drawn from `DESKTOP_USER_AGENTS`.
pub fn build_headless_config(exe: &str, width: u32, height: u32) -> Result<BrowserConfig> {
    let ua = random_user_agent();

    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--disable-extensions")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio")
        .arg("--log-level=3")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", ua))
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

// ── Page rendering ───────────────────────────────────────────────────────────

/// Elements that usually close cookie banners, newsletter modals and the like.
pub const POPUP_CLOSE_SELECTOR: &str =
    "[class*='close'], [class*='dismiss'], [aria-label*='close'], [aria-label*='Close']";

/// Timing knobs for [`render_page`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub chrome_executable: Option<String>,
    /// Navigation budget. Hitting it is logged and the page is captured anyway.
    pub page_load_timeout: Duration,
    /// Fixed sleep after navigation for client-side rendering.
    pub settle: Duration,
}

/// Render `url` in a fresh headless browser and return the page HTML.
///
/// The browser is closed on every path; a close error never shadows the
/// render result.
pub async fn render_page(url: &str, options: &RenderOptions) -> Result<String> {
    let exe = find_chrome_executable(options.chrome_executable.as_deref()).ok_or_else(|| {
        anyhow!("No browser found. Install Chrome, Chromium, or Brave, or set CHROME_EXECUTABLE.")
    })?;

    info!("🌐 Headless render: {} (browser: {})", url, exe);

    let config = build_headless_config(&exe, 1920, 1080)?;
    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| anyhow!("Failed to launch browser ({}): {}", exe, e))?;

    let _handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                warn!("CDP handler error: {}", e);
            }
        }
    });

    let result: Result<String> = async {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("Failed to open tab: {}", e))?;

        match tokio::time::timeout(options.page_load_timeout, page.goto(url)).await {
            Ok(Ok(_)) => info!("Page loaded successfully"),
            Ok(Err(e)) => return Err(anyhow!("Failed to navigate to {}: {}", url, e)),
            Err(_) => warn!(
                "Page load timeout after {}s, continuing with what has rendered",
                options.page_load_timeout.as_secs()
            ),
        }

        info!(
            "Waiting {}ms for page content to load...",
            options.settle.as_millis()
        );
        tokio::time::sleep(options.settle).await;

        match dismiss_popups(&page).await {
            Ok(0) => {}
            Ok(n) => {
                info!("Dismissed {} overlay element(s)", n);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => warn!("Popup dismissal failed (ignored): {}", e),
        }

        let html = page
            .content()
            .await
            .map_err(|e| anyhow!("Failed to get page content: {}", e))?;

        info!("✅ Render captured {} chars", html.len());
        Ok(html)
    }
    .await;

    if let Err(e) = browser.close().await {
        warn!("Browser close error (non-fatal): {}", e);
    }

    result
}

/// Click every visible element matching [`POPUP_CLOSE_SELECTOR`]. Click errors
/// are swallowed per element. Returns how many were clicked.
pub async fn dismiss_popups(page: &Page) -> Result<u64> {
    let script = format!(
        r#"(() => {{
            let clicked = 0;
            for (const el of document.querySelectorAll("{selector}")) {{
                const style = window.getComputedStyle(el);
                if (el.offsetParent === null || style.visibility === 'hidden' || style.display === 'none') {{
                    continue;
                }}
                try {{ el.click(); clicked++; }} catch (e) {{}}
            }}
            return clicked;
        }})()"#,
        selector = POPUP_CLOSE_SELECTOR
    );

    let clicked = page
        .evaluate(script)
        .await
        .map_err(|e| anyhow!("popup script failed: {}", e))?
        .into_value::<serde_json::Value>()
        .ok()
        .and_then(|v| v.as_u64())
        .unwrap_or(0);

    Ok(clicked)
}
