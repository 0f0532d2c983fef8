//! Automation-fingerprint evasion scripts.
//!
//! The platform's player refuses to load when it detects an automated
//! browser. These scripts patch the usual detection vectors before any
//! page script runs. Injection is best-effort: a script failing on one
//! page does not abort navigation.

use chromiumoxide::Page;
use tracing::debug;

const EVASION_SCRIPTS: &[&str] = &[
    // navigator.webdriver is the first thing detectors check
    r"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true
    });
    ",
    // Headless Chrome ships without a window.chrome object
    r"
    window.chrome = {
        runtime: {},
        loadTimes: function() {},
        csi: function() {},
        app: {}
    };
    ",
    // An empty plugin list reads as headless
    r"
    Object.defineProperty(navigator, 'plugins', {
        get: () => [
            { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
            { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai', description: '' },
            { name: 'Native Client', filename: 'internal-nacl-plugin', description: '' }
        ],
        configurable: true
    });
    ",
    r"
    Object.defineProperty(navigator, 'languages', {
        get: () => ['en-US', 'en'],
        configurable: true
    });
    ",
    // ChromeDriver leaks cdc_ globals
    r"
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Array;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Promise;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Symbol;
    ",
];

/// Injects the evasion scripts into a page. Failures are logged and
/// skipped; injection can legitimately fail during page transitions.
pub async fn apply(page: &Page) {
    for script in EVASION_SCRIPTS {
        if let Err(e) = page.evaluate((*script).to_string()).await {
            debug!("evasion script skipped: {e}");
        }
    }
}
