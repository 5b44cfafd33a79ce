use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlButtonElement, HtmlElement};

use super::{
    AltitudeGame, AltitudeSurface, AltitudeTracker, Milestone, Progress, SkyBand,
    achievement_title, goal_label, group_thousands, launch_label,
};
use crate::config::AltitudeConfig;
use crate::dom;
use crate::timer::BrowserScheduler;
use crate::tones::WebAudioPlayer;

struct DomAltitudeSurface {
    button: HtmlButtonElement,
    character: Element,
    altitude: Element,
    next_goal: Element,
    progress_fill: HtmlElement,
    progress_text: Element,
    popup: Element,
    popup_title: Element,
    popup_text: Element,
    body: Option<HtmlElement>,
}

impl DomAltitudeSurface {
    fn find() -> Result<Self, JsValue> {
        let doc = dom::document()?;
        Ok(Self {
            button: dom::element(&doc, "levelUpBtn")?,
            character: dom::query(&doc, ".character")?,
            altitude: dom::element(&doc, "altitudeValue")?,
            next_goal: dom::element(&doc, "nextGoalText")?,
            progress_fill: dom::element(&doc, "progressFill")?,
            progress_text: dom::element(&doc, "progressText")?,
            popup: dom::element(&doc, "achievementPopup")?,
            popup_title: dom::element(&doc, "achievementTitle")?,
            popup_text: dom::element(&doc, "achievementText")?,
            body: doc.body(),
        })
    }
}

impl AltitudeSurface for DomAltitudeSurface {
    fn show_status(&self, progress: &Progress) {
        self.altitude
            .set_text_content(Some(&format!("{}m", group_thousands(progress.altitude))));
        self.next_goal
            .set_text_content(Some(&goal_label(progress.current_goal)));
        self.progress_fill
            .style()
            .set_property("width", &format!("{}%", progress.percent))
            .ok();
        self.progress_text
            .set_text_content(Some(&progress.percent_label()));
    }

    fn set_launching(&self, gain: Option<u64>) {
        self.button.set_text_content(Some(&launch_label(gain)));
        self.button.set_disabled(gain.is_some());
        self.character
            .class_list()
            .toggle_with_force("fly", gain.is_some())
            .ok();
    }

    fn show_achievement(&self, milestone: &Milestone) {
        self.popup_title
            .set_text_content(Some(&achievement_title(milestone)));
        self.popup_text.set_text_content(Some(milestone.reward));
        self.popup.class_list().add_1("show").ok();
    }

    fn hide_achievement(&self) {
        self.popup.class_list().remove_1("show").ok();
    }

    fn set_sky(&self, band: SkyBand) {
        let Some(body) = &self.body else {
            return;
        };
        let classes = body.class_list();
        for other in SkyBand::ALL {
            if other != band {
                classes.remove_1(other.css_class()).ok();
            }
        }
        classes.add_1(band.css_class()).ok();
    }
}

/// Handle returned to JS. Keeps the game alive until `teardown`.
#[wasm_bindgen]
pub struct AltitudeApp {
    game: Rc<AltitudeGame<BrowserScheduler>>,
}

#[wasm_bindgen]
impl AltitudeApp {
    /// Same as clicking the launch button; returns the gain, or `undefined` if ignored.
    pub fn launch(&self) -> Option<u32> {
        self.game
            .launch()
            .map(|advance| u32::try_from(advance.gain).unwrap_or(u32::MAX))
    }

    pub fn altitude(&self) -> f64 {
        self.game.altitude() as f64
    }

    pub fn level(&self) -> u32 {
        self.game.level()
    }

    pub fn teardown(&self) {
        self.game.teardown();
    }
}

#[wasm_bindgen]
pub fn start_altitude_game() -> Result<AltitudeApp, JsValue> {
    mount(AltitudeConfig::default())
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_altitude_game_with_config(json: &str) -> Result<AltitudeApp, JsValue> {
    mount(AltitudeConfig::from_json(json)?)
}

fn mount(config: AltitudeConfig) -> Result<AltitudeApp, JsValue> {
    let surface = DomAltitudeSurface::find()?;
    let button = surface.button.clone();
    let scheduler = Rc::new(BrowserScheduler::new()?);
    let tracker = AltitudeTracker::new(&config);
    let game = Rc::new(AltitudeGame::new(
        config,
        tracker,
        scheduler,
        Rc::new(surface),
        Rc::new(WebAudioPlayer::new()),
        Box::new(SmallRng::from_entropy()),
    ));

    let weak = Rc::downgrade(&game);
    dom::on_click(&button, move || {
        if let Some(game) = weak.upgrade() {
            game.launch();
        }
    })?;

    log::info!("altitude game mounted");
    Ok(AltitudeApp { game })
}
