// portfolio_core: Rust/WASM engine for the portfolio page.
// All interaction logic lives here as clock-driven state; the host only applies patches.

mod autoplay;
mod carousel;
#[cfg(feature = "dom")]
mod dom;
mod error;
mod gesture;
mod menu;
mod page;
mod scroll;
mod surface;
mod text;
mod types;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub use autoplay::AutoplayController;
pub use carousel::{circular_offset, layout_for_offset, Carousel, CarouselItem, ItemLayout};
#[cfg(feature = "dom")]
pub use dom::{mount, DomSurface};
pub use error::PortfolioError;
pub use gesture::{classify_swipe, SwipeRecognizer};
pub use menu::MobileMenu;
pub use page::Page;
pub use scroll::{section_at, ScrollHighlighter};
pub use surface::{AppliedTransform, RecordingSurface, Surface};
pub use text::{LabelRotator, Typewriter};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Main engine interface exposed to JavaScript.
/// Batch interface to minimize JS↔WASM crossings; every call returns a JSON array of patches.
#[wasm_bindgen]
pub struct Engine {
    page: Page,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Engine, JsValue> {
        let config: PortfolioConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

        let page = Page::new(config).map_err(to_js)?;
        Ok(Engine { page })
    }

    /// Patches for the first paint.
    pub fn initial_patches(&self) -> Result<String, JsValue> {
        patches_json(&self.page.initial_patches())
    }

    /// Process a batch of input events (`{"events":[...]}`).
    /// Each event carries `timestamp_ms` from the same `performance.now()` clock as `tick`.
    /// Events that fail (an out-of-range index) are skipped and logged; only malformed JSON errors.
    pub fn handle_events(&mut self, events_json: &str) -> Result<String, JsValue> {
        let batch: EventBatch = serde_json::from_str(events_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid events: {}", e)))?;

        patches_json(&self.page.handle_batch(&batch))
    }

    /// Advance timers to `now_ms` (a `performance.now()` reading).
    pub fn tick(&mut self, now_ms: f64) -> Result<String, JsValue> {
        patches_json(&self.page.tick(Timestamp::from_millis(now_ms)))
    }

    /// Advance timers to the current `performance.now()` reading.
    pub fn tick_now(&mut self) -> Result<String, JsValue> {
        self.tick(performance_now()?)
    }

    pub fn current_index(&self) -> usize {
        self.page.carousel().current_index()
    }

    pub fn is_playing(&self) -> bool {
        self.page.autoplay().is_playing()
    }

    pub fn is_animating(&self) -> bool {
        self.page.carousel().is_animating()
    }
}

fn patches_json(patches: &[ViewPatch]) -> Result<String, JsValue> {
    serde_json::to_string(patches)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// `performance.now()` on the global object, so it also works inside workers.
fn performance_now() -> Result<f64, JsValue> {
    let performance = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("performance"))?;
    let now: js_sys::Function = js_sys::Reflect::get(&performance, &JsValue::from_str("now"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("performance.now is not available"))?;
    now.call0(&performance)?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("performance.now returned a non-number"))
}

fn to_js(err: PortfolioError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
