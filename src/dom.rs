//! Small DOM lookups shared by the widget front-ends.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, EventTarget, window};

pub(crate) fn document() -> Result<Document, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    win.document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub(crate) fn element<T: JsCast>(doc: &Document, id: &str) -> Result<T, JsValue> {
    let el = doc
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?;
    el.dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has an unexpected type")))
}

pub(crate) fn query(doc: &Document, selector: &str) -> Result<Element, JsValue> {
    doc.query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("nothing matches {selector}")))
}

/// Attaches a click handler for the lifetime of the page.
pub(crate) fn on_click(target: &EventTarget, mut handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| handler())
        as Box<dyn FnMut(web_sys::MouseEvent)>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
