// Browser binding: applies patches to the live document and feeds DOM events to the page.
// Only built with the `dom` feature; JS hosts can use `Engine` instead.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlFormElement, HtmlImageElement,
    ScrollBehavior, ScrollIntoViewOptions, ScrollToOptions, TouchEvent, Window,
};

use crate::error::PortfolioError;
use crate::page::Page;
use crate::surface::Surface;
use crate::types::*;

/// How often the page clock is advanced.
const TICK_INTERVAL_MS: i32 = 50;

fn dom_err(err: JsValue) -> PortfolioError {
    PortfolioError::Dom(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

fn query_all(root: &Document, selector: &str) -> Result<Vec<HtmlElement>, PortfolioError> {
    let list = root.query_selector_all(selector).map_err(dom_err)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

fn query_one(root: &Document, selector: &str) -> Option<HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn child(root: &Element, selector: &str) -> Option<HtmlElement> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Applies patches to the portfolio page markup.
pub struct DomSurface {
    window: Window,
    document: Document,
    items: Vec<HtmlElement>,
    reflections: Vec<Option<HtmlElement>>,
    dots: Vec<HtmlElement>,
    menu_items: Vec<HtmlElement>,
    stat_labels: Vec<HtmlElement>,
    submitted_form: Option<HtmlFormElement>,
}

impl core::fmt::Debug for DomSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomSurface")
            .field("items", &self.items.len())
            .field("dots", &self.dots.len())
            .field("menu_items", &self.menu_items.len())
            .field("stat_labels", &self.stat_labels.len())
            .finish()
    }
}

impl DomSurface {
    /// Look up every element the engine addresses. Dots must already exist.
    pub fn bind(window: Window, document: Document) -> Result<Self, PortfolioError> {
        let items = query_all(&document, ".coverflow-item")?;
        let reflections = items.iter().map(|item| child(item, ".reflection")).collect();
        let dots = query_all(&document, ".dot")?;
        let menu_items = query_all(&document, ".menu-item")?;
        let stat_labels = query_all(&document, ".stat-item .stat-name")?;

        Ok(DomSurface {
            window,
            document,
            items,
            reflections,
            dots,
            menu_items,
            stat_labels,
            submitted_form: None,
        })
    }

    /// Remember which form the next `ResetForm` applies to.
    pub fn set_submitted_form(&mut self, form: Option<HtmlFormElement>) {
        self.submitted_form = form;
    }

    fn by_id(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn element(&self, target: Target) -> Option<HtmlElement> {
        match target {
            Target::Item(i) => self.items.get(i).cloned(),
            Target::Dot(i) => self.dots.get(i).cloned(),
            Target::Reflection(i) => self.reflections.get(i).cloned().flatten(),
            Target::MenuItem(i) => self.menu_items.get(i).cloned(),
            Target::StatLabel(i) => self.stat_labels.get(i).cloned(),
            Target::CaptionTitle => self.by_id("current-title"),
            Target::CaptionDescription => self.by_id("current-description"),
            Target::Header => self.by_id("header"),
            Target::ScrollToTop => self.by_id("scrollToTop"),
            Target::MenuToggle => self.by_id("menuToggle"),
            Target::MainMenu => self.by_id("mainMenu"),
            Target::TypewriterName => self.by_id("typewriter-name"),
            Target::RoleLabel => self.by_id("rotating-roles"),
            Target::PlayIcon => query_one(&self.document, ".play-icon"),
            Target::PauseIcon => query_one(&self.document, ".pause-icon"),
            Target::AboutHeader => query_one(&self.document, ".about-header"),
            Target::TypewriterCursor => query_one(&self.document, ".cursor-blink"),
        }
    }

    fn with_element(
        &self,
        target: Target,
        write: impl FnOnce(&HtmlElement) -> Result<(), JsValue>,
    ) -> Result<(), PortfolioError> {
        match self.element(target) {
            Some(el) => write(&el).map_err(dom_err),
            None => {
                trace!(?target, "patch target not on page");
                Ok(())
            }
        }
    }
}

impl Surface for DomSurface {
    fn apply(&mut self, patch: &ViewPatch) -> Result<(), PortfolioError> {
        match patch {
            ViewPatch::ItemTransform {
                index,
                transform,
                opacity,
                z_index,
            } => self.with_element(Target::Item(*index), |el| {
                let style = el.style();
                style.set_property("transform", transform)?;
                style.set_property("opacity", &opacity.to_string())?;
                style.set_property("z-index", &z_index.to_string())
            }),
            ViewPatch::ToggleClass { target, class, on } => {
                self.with_element(*target, |el| {
                    el.class_list()
                        .toggle_with_force(class.as_str(), *on)
                        .map(|_| ())
                })
            }
            ViewPatch::SetText { target, text } => self.with_element(*target, |el| {
                el.set_text_content(Some(text));
                Ok(())
            }),
            ViewPatch::SetStyle {
                target,
                property,
                value,
            } => self.with_element(*target, |el| {
                el.style().set_property(property.as_str(), value)
            }),
            ViewPatch::ScrollTo { top } => {
                let options = ScrollToOptions::new();
                options.set_top(*top);
                options.set_behavior(ScrollBehavior::Smooth);
                self.window.scroll_to_with_scroll_to_options(&options);
                Ok(())
            }
            ViewPatch::ScrollIntoView { anchor } => {
                let id = anchor.trim_start_matches('#');
                if let Some(section) = self.document.get_element_by_id(id) {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    section.scroll_into_view_with_scroll_into_view_options(&options);
                }
                Ok(())
            }
            ViewPatch::Notify { message } => {
                self.window.alert_with_message(message).map_err(dom_err)
            }
            ViewPatch::ResetForm => {
                if let Some(form) = self.submitted_form.take() {
                    form.reset();
                }
                Ok(())
            }
        }
    }
}

/// Page engine plus the surface it paints on.
struct App {
    window: Window,
    page: Page,
    surface: DomSurface,
    sections: Vec<HtmlElement>,
    about_header: Option<HtmlElement>,
}

impl App {
    fn now(&self) -> Timestamp {
        let ms = self.window.performance().map(|p| p.now()).unwrap_or(0.0);
        Timestamp::from_millis(ms)
    }

    fn paint(&mut self, patches: &[ViewPatch]) {
        if let Err(err) = self.surface.apply_all(patches) {
            warn!(%err, "failed to apply patches");
        }
    }

    fn dispatch(&mut self, event_type: EventType) {
        let event = InputEvent::new(self.now(), event_type);
        match self.page.handle(&event) {
            Ok(patches) => self.paint(&patches),
            Err(err) => warn!(%err, "event rejected"),
        }
    }

    fn tick(&mut self) {
        let patches = self.page.tick(self.now());
        self.paint(&patches);
    }

    fn on_scroll(&mut self) {
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        let sections = self
            .sections
            .iter()
            .map(|s| SectionBounds::new(s.offset_top() as f64, s.client_height() as f64))
            .collect();
        self.dispatch(EventType::Scroll { scroll_y, sections });
        self.report_about_visibility();
    }

    fn report_about_visibility(&mut self) {
        if self.page.is_revealed() {
            return;
        }
        let Some(header) = &self.about_header else {
            return;
        };

        let rect = header.get_bounding_client_rect();
        let viewport = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let visible = (rect.bottom().min(viewport) - rect.top().max(0.0)).max(0.0);
        let ratio = if rect.height() > 0.0 {
            (visible / rect.height()) as f32
        } else {
            0.0
        };
        self.dispatch(EventType::AboutHeaderVisibility { ratio });
    }
}

type Shared = Rc<RefCell<App>>;

fn listen(
    target: &EventTarget,
    kind: &str,
    app: &Shared,
    mut handler: impl FnMut(&mut App, Event) + 'static,
) -> Result<(), JsValue> {
    let app = Rc::clone(app);
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        match app.try_borrow_mut() {
            Ok(mut app) => handler(&mut app, event),
            Err(_) => warn!("re-entrant DOM event dropped"),
        }
    });
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn first_touch(event: &Event) -> Option<(f32, f32)> {
    let touch = event.dyn_ref::<TouchEvent>()?.changed_touches().get(0)?;
    Some((touch.client_x() as f32, touch.client_y() as f32))
}

fn create_dots(document: &Document, count: usize) -> Result<(), JsValue> {
    let Some(container) = document.get_element_by_id("dots") else {
        return Ok(());
    };
    for _ in 0..count {
        let dot = document.create_element("div")?;
        dot.set_class_name("dot");
        container.append_child(&dot)?;
    }
    Ok(())
}

fn menu_from_markup(document: &Document) -> Result<Vec<MenuEntry>, PortfolioError> {
    Ok(query_all(document, ".menu-item")?
        .iter()
        .map(|el| MenuEntry {
            href: el.get_attribute("href").unwrap_or_default(),
            external: el.class_list().contains("external"),
        })
        .collect())
}

/// Bind the page: create dots, wire listeners, paint, and start the clock.
#[wasm_bindgen]
pub fn mount(config_json: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let mut config: PortfolioConfig = serde_json::from_str(config_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
    if config.menu.is_empty() {
        config.menu = menu_from_markup(&document).map_err(to_js)?;
    }

    let item_count = query_all(&document, ".coverflow-item")
        .map_err(to_js)?
        .len();
    if item_count != config.carousel.items.len() {
        return Err(to_js(PortfolioError::InvalidConfig(format!(
            "page has {} carousel items but config describes {}",
            item_count,
            config.carousel.items.len()
        ))));
    }
    create_dots(&document, item_count)?;

    let page = Page::new(config).map_err(to_js)?;
    let surface = DomSurface::bind(window.clone(), document.clone()).map_err(to_js)?;
    let app: Shared = Rc::new(RefCell::new(App {
        window: window.clone(),
        page,
        surface,
        sections: query_all(&document, ".section").map_err(to_js)?,
        about_header: query_one(&document, ".about-header"),
    }));

    bind_carousel(&document, &app)?;
    bind_navigation(&window, &document, &app)?;

    {
        let mut app = app.borrow_mut();
        let patches = app.page.initial_patches();
        app.paint(&patches);
        app.on_scroll();
    }

    let ticker = {
        let app = Rc::clone(&app);
        Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.tick();
            }
        })
    };
    window.set_interval_with_callback_and_timeout_and_arguments_0(
        ticker.as_ref().unchecked_ref(),
        TICK_INTERVAL_MS,
    )?;
    ticker.forget();

    debug!(items = item_count, "portfolio page mounted");
    Ok(())
}

fn bind_carousel(document: &Document, app: &Shared) -> Result<(), JsValue> {
    let items = query_all(document, ".coverflow-item").map_err(to_js)?;
    for (index, item) in items.iter().enumerate() {
        listen(item, "click", app, move |app, _| {
            app.dispatch(EventType::ItemClick { index })
        })?;

        let img = child(item, "img").and_then(|el| el.dyn_into::<HtmlImageElement>().ok());
        if let Some(img) = img {
            // Replay images that settled before the listeners existed.
            if img.complete() {
                let event = if img.natural_width() > 0 {
                    EventType::ImageLoaded {
                        index,
                        src: img.src(),
                    }
                } else {
                    EventType::ImageFailed { index }
                };
                app.borrow_mut().dispatch(event);
            }
            let loaded = img.clone();
            listen(&img, "load", app, move |app, _| {
                app.dispatch(EventType::ImageLoaded {
                    index,
                    src: loaded.src(),
                })
            })?;
            listen(&img, "error", app, move |app, _| {
                app.dispatch(EventType::ImageFailed { index })
            })?;
        }
    }

    let dots = query_all(document, ".dot").map_err(to_js)?;
    for (index, dot) in dots.iter().enumerate() {
        listen(dot, "click", app, move |app, _| {
            app.dispatch(EventType::DotClick { index })
        })?;
    }

    if let Some(container) = query_one(document, ".coverflow-container") {
        listen(&container, "touchstart", app, |app, event| {
            if let Some((x, y)) = first_touch(&event) {
                app.dispatch(EventType::TouchStart { x, y });
            }
        })?;
        listen(&container, "touchmove", app, |app, event| {
            if let Some((x, y)) = first_touch(&event) {
                app.dispatch(EventType::TouchMove { x, y });
            }
        })?;
        listen(&container, "touchend", app, |app, event| {
            if let Some((x, y)) = first_touch(&event) {
                app.dispatch(EventType::TouchEnd { x, y });
            }
        })?;
        listen(&container, "transitionend", app, |app, _| {
            app.dispatch(EventType::TransitionEnd)
        })?;
    }

    // The play/pause icons share one toggle button.
    let toggle_button = query_one(document, ".play-icon").and_then(|icon| icon.parent_element());
    if let Some(button) = toggle_button {
        listen(&button, "click", app, |app, _| {
            app.dispatch(EventType::AutoplayToggle)
        })?;
    }

    Ok(())
}

fn bind_navigation(window: &Window, document: &Document, app: &Shared) -> Result<(), JsValue> {
    let toggle = document.get_element_by_id("menuToggle");
    let main_menu = document.get_element_by_id("mainMenu");

    if let Some(toggle) = &toggle {
        listen(toggle, "click", app, |app, _| {
            app.dispatch(EventType::MenuToggleClick)
        })?;
    }

    {
        let toggle = toggle.clone();
        let main_menu = main_menu.clone();
        listen(document, "click", app, move |app, event| {
            let target = event.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok());
            let inside = |el: &Option<Element>| {
                el.as_ref()
                    .map(|el| el.contains(target.as_ref()))
                    .unwrap_or(false)
            };
            if !inside(&toggle) && !inside(&main_menu) {
                app.dispatch(EventType::OutsideClick);
            }
        })?;
    }

    let menu_items = query_all(document, ".menu-item").map_err(to_js)?;
    for (index, item) in menu_items.iter().enumerate() {
        let in_page = item
            .get_attribute("href")
            .map(|href| href.starts_with('#'))
            .unwrap_or(false);
        listen(item, "click", app, move |app, event| {
            if in_page {
                event.prevent_default();
            }
            app.dispatch(EventType::MenuItemClick { index });
        })?;
    }

    if let Some(logo) = query_one(document, ".logo-container") {
        listen(&logo, "click", app, |app, event| {
            event.prevent_default();
            app.dispatch(EventType::LogoClick);
        })?;
    }

    if let Some(button) = document.get_element_by_id("scrollToTop") {
        listen(&button, "click", app, |app, _| {
            app.dispatch(EventType::ScrollTopClick)
        })?;
    }

    listen(window, "scroll", app, |app, _| app.on_scroll())?;

    for form in query_all(document, "form").map_err(to_js)? {
        listen(&form, "submit", app, |app, event| {
            event.prevent_default();
            let form = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlFormElement>().ok());
            app.surface.set_submitted_form(form);
            app.dispatch(EventType::FormSubmit);
        })?;
    }

    Ok(())
}

fn to_js(err: PortfolioError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
