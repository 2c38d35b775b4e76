// Strong typing over strings: timestamps, typed class/style names, config, events, patches.

use serde::{Deserialize, Serialize};

/// Timestamp in microseconds. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    /// Build from a host clock reading such as `performance.now()`.
    /// Negative and non-finite readings collapse to zero.
    pub fn from_millis(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0).round() as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// This timestamp shifted forward by `ms` milliseconds.
    pub fn plus_millis(&self, ms: u64) -> Self {
        Timestamp(self.0.saturating_add(ms.saturating_mul(1000)))
    }

    /// Whole milliseconds elapsed since `earlier` (zero if `earlier` is later).
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0) / 1000
    }
}

/// Navigation direction through the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Signed index step: +1 or -1.
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Loading state of a carousel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    Failed,
}

// =============================================================================
// Page targets, classes and style properties
// =============================================================================

/// An element of the page that a patch addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index")]
pub enum Target {
    Item(usize),
    Dot(usize),
    Reflection(usize),
    CaptionTitle,
    CaptionDescription,
    PlayIcon,
    PauseIcon,
    Header,
    ScrollToTop,
    MenuToggle,
    MainMenu,
    MenuItem(usize),
    AboutHeader,
    TypewriterName,
    TypewriterCursor,
    RoleLabel,
    StatLabel(usize),
}

/// CSS classes the engine toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Class {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "image-loading")]
    ImageLoading,
    #[serde(rename = "scrolled")]
    Scrolled,
    #[serde(rename = "visible")]
    Visible,
    #[serde(rename = "animate-in")]
    AnimateIn,
}

impl Class {
    pub fn as_str(&self) -> &'static str {
        match self {
            Class::Active => "active",
            Class::ImageLoading => "image-loading",
            Class::Scrolled => "scrolled",
            Class::Visible => "visible",
            Class::AnimateIn => "animate-in",
        }
    }
}

/// Inline style properties the engine writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StyleProperty {
    #[serde(rename = "opacity")]
    Opacity,
    #[serde(rename = "transform")]
    Transform,
    #[serde(rename = "transition")]
    Transition,
    #[serde(rename = "display")]
    Display,
    #[serde(rename = "background-image")]
    BackgroundImage,
    #[serde(rename = "background-size")]
    BackgroundSize,
    #[serde(rename = "background-position")]
    BackgroundPosition,
    #[serde(rename = "--bg-image")]
    BgImageVar,
}

impl StyleProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleProperty::Opacity => "opacity",
            StyleProperty::Transform => "transform",
            StyleProperty::Transition => "transition",
            StyleProperty::Display => "display",
            StyleProperty::BackgroundImage => "background-image",
            StyleProperty::BackgroundSize => "background-size",
            StyleProperty::BackgroundPosition => "background-position",
            StyleProperty::BgImageVar => "--bg-image",
        }
    }
}

/// One side effect for the host to apply. The engine never touches the DOM itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ViewPatch {
    /// Full coverflow placement of one item.
    ItemTransform {
        index: usize,
        transform: String,
        opacity: f64,
        z_index: i32,
    },
    ToggleClass {
        target: Target,
        class: Class,
        on: bool,
    },
    SetText {
        target: Target,
        text: String,
    },
    SetStyle {
        target: Target,
        property: StyleProperty,
        value: String,
    },
    /// Smooth scroll of the window to an absolute offset.
    ScrollTo { top: f64 },
    /// Smooth scroll to an in-page anchor (`#id`).
    ScrollIntoView { anchor: String },
    Notify { message: String },
    ResetForm,
}

impl ViewPatch {
    pub fn class(target: Target, class: Class, on: bool) -> Self {
        ViewPatch::ToggleClass { target, class, on }
    }

    pub fn style(target: Target, property: StyleProperty, value: impl Into<String>) -> Self {
        ViewPatch::SetStyle {
            target,
            property,
            value: value.into(),
        }
    }

    pub fn text(target: Target, text: impl Into<String>) -> Self {
        ViewPatch::SetText {
            target,
            text: text.into(),
        }
    }
}

// =============================================================================
// Input events
// =============================================================================

/// Vertical bounds of a page section, as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SectionBounds {
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    pub fn new(top: f64, height: f64) -> Self {
        SectionBounds { top, height }
    }

    /// Inclusive top, exclusive bottom.
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

/// Batch of input events from JS (minimizes JS↔WASM crossings).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventBatch {
    pub events: Vec<InputEvent>,
}

/// Single input event from the page.
/// On the wire the time is `timestamp_ms`, read from the same `performance.now()` clock as ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEvent {
    #[serde(rename = "timestamp_ms", with = "host_millis")]
    pub timestamp: Timestamp,
    pub event_type: EventType,
}

/// (De)serializes a [`Timestamp`] as host milliseconds.
mod host_millis {
    use super::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(ts.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        f64::deserialize(deserializer).map(Timestamp::from_millis)
    }
}

impl InputEvent {
    pub fn new(timestamp: Timestamp, event_type: EventType) -> Self {
        InputEvent {
            timestamp,
            event_type,
        }
    }
}

/// Type of input event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    /// Explicit previous/next request (buttons, keyboard).
    Navigate { direction: Direction },
    ItemClick { index: usize },
    DotClick { index: usize },
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    /// The active item finished its CSS transition.
    TransitionEnd,
    AutoplayToggle,
    ImageLoaded { index: usize, src: String },
    ImageFailed { index: usize },
    Scroll {
        scroll_y: f64,
        #[serde(default)]
        sections: Vec<SectionBounds>,
    },
    /// Fraction of the about header currently inside the viewport.
    AboutHeaderVisibility { ratio: f32 },
    MenuToggleClick,
    MenuItemClick { index: usize },
    /// Click that landed outside both the menu toggle and the menu.
    OutsideClick,
    LogoClick,
    ScrollTopClick,
    FormSubmit,
}

// =============================================================================
// Configuration
// =============================================================================

/// Engine configuration passed from JS. `{}` yields the stock carousel, timers and labels.
/// Menu entries depend on the page markup and default to none; `dom::mount` reads them from
/// `.menu-item` links when the list is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub autoplay: AutoplaySettings,
    #[serde(default)]
    pub swipe: SwipeSettings,
    #[serde(default)]
    pub scroll: ScrollSettings,
    /// Navigation entries, in the same order as the page sections.
    #[serde(default)]
    pub menu: Vec<MenuEntry>,
    #[serde(default)]
    pub typewriter: TypewriterSettings,
    #[serde(default = "default_roles")]
    pub roles: RotatorSettings,
    #[serde(default = "default_stats")]
    pub stats: Vec<RotatorSettings>,
    /// Visible fraction of the about header that starts the header animations.
    #[serde(default = "default_reveal_threshold")]
    pub reveal_threshold: f32,
    #[serde(default = "default_form_message")]
    pub form_message: String,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        PortfolioConfig {
            carousel: CarouselConfig::default(),
            autoplay: AutoplaySettings::default(),
            swipe: SwipeSettings::default(),
            scroll: ScrollSettings::default(),
            menu: Vec::new(),
            typewriter: TypewriterSettings::default(),
            roles: default_roles(),
            stats: default_stats(),
            reveal_threshold: default_reveal_threshold(),
            form_message: default_form_message(),
        }
    }
}

fn default_reveal_threshold() -> f32 {
    0.3
}

fn default_form_message() -> String {
    "Thank you for your message! We'll get back to you soon.".to_string()
}

/// Carousel content and behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_items")]
    pub items: Vec<ItemConfig>,
    /// Defaults to the middle item.
    #[serde(default)]
    pub initial_index: Option<usize>,
    #[serde(default)]
    pub geometry: CoverflowGeometry,
    #[serde(default)]
    pub lock: LockPolicy,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        CarouselConfig {
            items: default_items(),
            initial_index: None,
            geometry: CoverflowGeometry::default(),
            lock: LockPolicy::default(),
        }
    }
}

/// One carousel entry as configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Image URL, when the host wants the engine to know it up front.
    #[serde(default)]
    pub image: Option<String>,
}

impl ItemConfig {
    pub fn new(title: &str, description: &str) -> Self {
        ItemConfig {
            title: title.to_string(),
            description: description.to_string(),
            image: None,
        }
    }
}

fn default_items() -> Vec<ItemConfig> {
    vec![
        ItemConfig::new(
            "Mountain Landscape",
            "Majestic peaks covered in snow during golden hour",
        ),
        ItemConfig::new("Forest Path", "A winding trail through ancient woodland"),
        ItemConfig::new(
            "Lake Reflection",
            "Serene waters mirroring the surrounding landscape",
        ),
        ItemConfig::new("Ocean Sunset", "Golden hour over endless ocean waves"),
        ItemConfig::new("Desert Dunes", "Rolling sand dunes under vast blue skies"),
        ItemConfig::new("Starry Night", "Countless stars illuminating the dark sky"),
        ItemConfig::new("Waterfall", "Cascading water through lush green forest"),
    ]
}

/// Coverflow placement constants. Distances are CSS pixels, angles degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverflowGeometry {
    #[serde(default = "default_spacing_x")]
    pub spacing_x: f64,
    #[serde(default = "default_depth_step")]
    pub depth_step: f64,
    #[serde(default = "default_rotation_step")]
    pub rotation_step: f64,
    #[serde(default = "default_max_rotation")]
    pub max_rotation: f64,
    #[serde(default = "default_opacity_step")]
    pub opacity_step: f64,
    #[serde(default = "default_scale_step")]
    pub scale_step: f64,
    /// Items further than this from the centre are hidden offscreen.
    #[serde(default = "default_visible_radius")]
    pub visible_radius: usize,
    #[serde(default = "default_offscreen_x")]
    pub offscreen_x: f64,
    #[serde(default = "default_base_z_index")]
    pub base_z_index: i32,
}

impl Default for CoverflowGeometry {
    fn default() -> Self {
        CoverflowGeometry {
            spacing_x: default_spacing_x(),
            depth_step: default_depth_step(),
            rotation_step: default_rotation_step(),
            max_rotation: default_max_rotation(),
            opacity_step: default_opacity_step(),
            scale_step: default_scale_step(),
            visible_radius: default_visible_radius(),
            offscreen_x: default_offscreen_x(),
            base_z_index: default_base_z_index(),
        }
    }
}

fn default_spacing_x() -> f64 {
    220.0
}

fn default_depth_step() -> f64 {
    200.0
}

fn default_rotation_step() -> f64 {
    60.0
}

fn default_max_rotation() -> f64 {
    60.0
}

fn default_opacity_step() -> f64 {
    0.2
}

fn default_scale_step() -> f64 {
    0.1
}

fn default_visible_radius() -> usize {
    3
}

fn default_offscreen_x() -> f64 {
    800.0
}

fn default_base_z_index() -> i32 {
    100
}

/// How the navigation lock taken by a transition is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum LockPolicy {
    /// Released on the first tick after the transition duration.
    Timed { duration_ms: u64 },
    /// Released when the host reports `TransitionEnd`.
    TransitionEnd,
    /// Navigation is never locked.
    Disabled,
}

impl Default for LockPolicy {
    fn default() -> Self {
        LockPolicy::Timed { duration_ms: 600 }
    }
}

/// Autoplay behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoplaySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_autoplay_interval")]
    pub interval_ms: u64,
}

impl Default for AutoplaySettings {
    fn default() -> Self {
        AutoplaySettings {
            enabled: true,
            interval_ms: default_autoplay_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_autoplay_interval() -> u64 {
    3000
}

/// Touch swipe recognition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeSettings {
    /// Minimum horizontal travel in CSS pixels.
    #[serde(default = "default_swipe_threshold")]
    pub threshold: f32,
}

impl Default for SwipeSettings {
    fn default() -> Self {
        SwipeSettings {
            threshold: default_swipe_threshold(),
        }
    }
}

fn default_swipe_threshold() -> f32 {
    30.0
}

/// Scroll-driven header and menu behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollSettings {
    /// Added to `scrollY` before testing which section is current.
    #[serde(default = "default_probe_offset")]
    pub probe_offset: f64,
    #[serde(default = "default_header_offset")]
    pub header_offset: f64,
    #[serde(default = "default_scroll_top_offset")]
    pub scroll_top_offset: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        ScrollSettings {
            probe_offset: default_probe_offset(),
            header_offset: default_header_offset(),
            scroll_top_offset: default_scroll_top_offset(),
        }
    }
}

fn default_probe_offset() -> f64 {
    100.0
}

fn default_header_offset() -> f64 {
    50.0
}

fn default_scroll_top_offset() -> f64 {
    500.0
}

/// A navigation menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub href: String,
    /// External links open normally and never take part in highlighting.
    #[serde(default)]
    pub external: bool,
}

impl MenuEntry {
    pub fn internal(href: &str) -> Self {
        MenuEntry {
            href: href.to_string(),
            external: false,
        }
    }

    pub fn external(href: &str) -> Self {
        MenuEntry {
            href: href.to_string(),
            external: true,
        }
    }

    /// The in-page anchor this entry scrolls to, if any.
    pub fn anchor(&self) -> Option<&str> {
        if self.href.starts_with('#') {
            Some(&self.href)
        } else {
            None
        }
    }
}

/// Typewriter reveal of the owner's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypewriterSettings {
    #[serde(default = "default_typewriter_text")]
    pub text: String,
    #[serde(default = "default_typewriter_start_delay")]
    pub start_delay_ms: u64,
    #[serde(default = "default_typewriter_char_delay")]
    pub char_delay_ms: u64,
    #[serde(default = "default_cursor_hide_delay")]
    pub cursor_hide_delay_ms: u64,
}

impl Default for TypewriterSettings {
    fn default() -> Self {
        TypewriterSettings {
            text: default_typewriter_text(),
            start_delay_ms: default_typewriter_start_delay(),
            char_delay_ms: default_typewriter_char_delay(),
            cursor_hide_delay_ms: default_cursor_hide_delay(),
        }
    }
}

fn default_typewriter_text() -> String {
    "Julliard Macatuggal".to_string()
}

fn default_typewriter_start_delay() -> u64 {
    1000
}

fn default_typewriter_char_delay() -> u64 {
    80
}

fn default_cursor_hide_delay() -> u64 {
    2000
}

/// A label that periodically fades out, swaps text, and fades back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotatorSettings {
    pub labels: Vec<String>,
    /// Extra wait before the first interval starts counting.
    #[serde(default)]
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
    /// Label shown by the first swap.
    #[serde(default = "default_next_index")]
    pub next_index: usize,
    /// Transition set once when the rotator starts.
    #[serde(default)]
    pub setup_transition: Option<String>,
    /// Transition set at every fade-out.
    #[serde(default)]
    pub cycle_transition: Option<String>,
}

fn default_fade_ms() -> u64 {
    300
}

fn default_next_index() -> usize {
    1
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_roles() -> RotatorSettings {
    RotatorSettings {
        labels: labels(&["Computer Programmer", "IT Technician"]),
        initial_delay_ms: 4000,
        interval_ms: 3000,
        fade_ms: default_fade_ms(),
        next_index: default_next_index(),
        setup_transition: Some("all 0.3s ease".to_string()),
        cycle_transition: None,
    }
}

fn stat_rotator(items: &[&str]) -> RotatorSettings {
    RotatorSettings {
        labels: labels(items),
        initial_delay_ms: 0,
        interval_ms: 8000,
        fade_ms: default_fade_ms(),
        next_index: default_next_index(),
        setup_transition: None,
        cycle_transition: Some("all 0.6s ease".to_string()),
    }
}

fn default_stats() -> Vec<RotatorSettings> {
    vec![
        stat_rotator(&["PMA Inventory System", "Sol'n: Serious Educational Game"]),
        stat_rotator(&[
            "Civil Service Professional Eligibility",
            "PHP for Beginners: PHP Crash Course",
            "Jira Agile Fundamentals: Build Strong Agile Basics",
            "Make a WordPress Website with Elementor",
            "Information Security Crash Course: Quick Steps to Safety",
        ]),
        stat_rotator(&[
            "Software Development and Design Thinking",
            "Sailing Smooth in Cyberspace: Strengthening Cybersecurity in the Age of ICT",
        ]),
    ]
}
