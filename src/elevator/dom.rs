use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlButtonElement, HtmlElement};

use super::{ElevatorController, ElevatorSurface, ElevatorView};
use crate::config::ElevatorConfig;
use crate::dom;
use crate::timer::BrowserScheduler;

/// Writes elevator state into the host page's markup.
struct DomElevatorSurface {
    floor: Element,
    arrow: Element,
    moving: Element,
    background: HtmlElement,
    up: HtmlButtonElement,
    down: HtmlButtonElement,
    character: Option<Element>,
}

impl DomElevatorSurface {
    fn find() -> Result<Self, JsValue> {
        let doc = dom::document()?;
        Ok(Self {
            floor: dom::element(&doc, "elevator-floor")?,
            arrow: dom::element(&doc, "elevator-arrow")?,
            moving: dom::element(&doc, "elevator-moving")?,
            background: dom::element(&doc, "elevator-background")?,
            up: dom::element(&doc, "elevator-up")?,
            down: dom::element(&doc, "elevator-down")?,
            character: doc.get_element_by_id("elevator-character"),
        })
    }
}

impl ElevatorSurface for DomElevatorSurface {
    fn render(&self, view: &ElevatorView) {
        self.floor.set_text_content(Some(&view.floor.to_string()));
        self.arrow
            .set_text_content(Some(view.direction.arrow().unwrap_or("")));
        self.moving
            .toggle_attribute_with_force("hidden", !view.moving)
            .ok();
        self.background
            .style()
            .set_property("top", &format!("{}px", view.background_top_px))
            .ok();
        self.up.set_disabled(!view.can_go_up);
        self.down.set_disabled(!view.can_go_down);
        if let Some(character) = &self.character {
            character
                .class_list()
                .toggle_with_force("bouncing", view.moving)
                .ok();
        }
    }
}

/// Handle returned to JS. Keeps the widget alive until `teardown`.
#[wasm_bindgen]
pub struct ElevatorApp {
    controller: Rc<ElevatorController<BrowserScheduler>>,
}

#[wasm_bindgen]
impl ElevatorApp {
    pub fn request_floor(&self, target: i32) -> bool {
        self.controller.request_floor(target)
    }

    pub fn floor(&self) -> i32 {
        self.controller.view().floor
    }

    pub fn is_moving(&self) -> bool {
        self.controller.view().moving
    }

    pub fn teardown(&self) {
        self.controller.teardown();
    }
}

#[wasm_bindgen]
pub fn start_elevator() -> Result<ElevatorApp, JsValue> {
    mount(ElevatorConfig::default())
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_elevator_with_config(json: &str) -> Result<ElevatorApp, JsValue> {
    mount(ElevatorConfig::from_json(json)?)
}

fn mount(config: ElevatorConfig) -> Result<ElevatorApp, JsValue> {
    let surface = DomElevatorSurface::find()?;
    let (up, down) = (surface.up.clone(), surface.down.clone());
    let scheduler = Rc::new(BrowserScheduler::new()?);
    let controller = Rc::new(ElevatorController::new(config, scheduler, Rc::new(surface)));

    // Buttons hold weak references so teardown is not blocked by listeners.
    let weak = Rc::downgrade(&controller);
    dom::on_click(&up, move || {
        if let Some(ctl) = weak.upgrade() {
            ctl.request_floor(ctl.view().floor + 1);
        }
    })?;
    let weak = Rc::downgrade(&controller);
    dom::on_click(&down, move || {
        if let Some(ctl) = weak.upgrade() {
            ctl.request_floor(ctl.view().floor - 1);
        }
    })?;

    log::info!("elevator mounted");
    Ok(ElevatorApp { controller })
}
