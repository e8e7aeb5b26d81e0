//! Fireworks Memory entry point
//!
//! In the browser this wires the canvas and page controls to a `Game` and runs
//! the requestAnimationFrame loop. Natively it runs a headless autopilot on a
//! virtual clock and prints the final state as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, HtmlButtonElement, HtmlCanvasElement,
        KeyboardEvent, PointerEvent,
    };

    use fireworks_memory::audio::ToneSynth;
    use fireworks_memory::consts::STANDARD_ROUNDS;
    use fireworks_memory::effects::{EffectKind, Effects, Tint};
    use fireworks_memory::platform;
    use fireworks_memory::sim::{
        Difficulty, FeedbackKind, Game, GameEvent, HintStyle, HudFlags, Notice, Phase, PlayField,
        Target,
    };
    use fireworks_memory::{EndlessBest, Settings};

    /// How long a toast stays up
    const TOAST_MS: f64 = 1400.0;
    /// Longest frame step fed to the game (tab switches, debugger pauses)
    const MAX_FRAME_MS: f64 = 250.0;
    /// How long a hard-mode blink dot stays drawn
    const BLINK_MS: f64 = 120.0;
    /// Viewport width above which the mobile menu is not shown
    const MENU_BREAKPOINT_PX: f64 = 900.0;
    const TIPS: &str =
        "Tips: A = difficulty • M = audio • E = endless • D = daily • I = instructions";

    /// Page state around the game
    struct App {
        game: Game,
        effects: Effects,
        synth: ToneSynth,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        document: Document,
        last_time: f64,
        toast_until: f64,
        blink: Option<(Target, f64)>,
        started: bool,
        pending_start: bool,
    }

    impl App {
        fn field(&self) -> PlayField {
            self.game.field()
        }

        fn element(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.element(id) {
                let _ = if hidden {
                    el.class_list().add_1("hidden")
                } else {
                    el.class_list().remove_1("hidden")
                };
            }
        }

        /// Match the canvas backing store to its CSS size
        fn fit_canvas(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let w = self.canvas.client_width().max(1);
            let h = self.canvas.client_height().max(1);
            self.canvas.set_width((w as f64 * dpr) as u32);
            self.canvas.set_height((h as f64 * dpr) as u32);
            let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
            self.game.resize(PlayField::new(w as f32, h as f32));
            log::debug!("Canvas resized to {}x{} (dpr {})", w, h, dpr);
        }

        fn start(&mut self, fresh: bool) {
            self.started = true;
            self.pending_start = false;
            self.synth.resume();
            self.set_hidden("intro", true);
            self.set_hidden("instructionsOverlay", true);
            self.set_hidden("victoryModal", true);
            self.effects.clear();
            if fresh {
                self.game.start_new_game();
            } else {
                self.game.start_game();
            }
            self.process_events();
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;

            self.game.advance(dt);
            self.process_events();
            self.effects.update(dt as f32);

            if let Some(target) = self.game.hard_blink(time) {
                self.blink = Some((target, time + BLINK_MS));
            }
            if self.toast_until > 0.0 && time >= self.toast_until {
                self.toast_until = 0.0;
                if let Some(el) = self.element("toast") {
                    let _ = el.class_list().remove_1("show");
                }
            }

            self.draw(time);
        }

        fn process_events(&mut self) {
            for event in self.game.drain_events() {
                match event {
                    GameEvent::TargetRevealed { target } => {
                        self.effects.burst(target.pos, Tint::REVEAL);
                        self.synth.play_tone(target.tone);
                    }
                    GameEvent::TargetConfirmed { target } => {
                        self.effects.burst(target.pos, Tint::CONFIRM);
                        self.synth.play_tone(target.tone);
                    }
                    GameEvent::RoundStateChanged {
                        phase,
                        round,
                        flags,
                    } => {
                        self.update_hud(round, &flags);
                        self.update_replay_button(&flags);
                        self.refresh_menu(&flags);
                        if phase != Phase::Victory {
                            self.set_hidden("victoryModal", true);
                        }
                    }
                    GameEvent::Celebration { kind, origin } => {
                        let field = self.field();
                        self.effects.celebrate(kind, origin, &field);
                        vibrate(kind.vibration_pattern());
                    }
                    GameEvent::Feedback { kind } => {
                        if kind == FeedbackKind::Lose {
                            let center = self.field().center();
                            self.effects.pulse(center, Tint::MISS, 250.0);
                        }
                        vibrate(kind.vibration_pattern());
                    }
                    GameEvent::Notice(Notice::VictoryShown) => {
                        self.set_hidden("victoryModal", false);
                    }
                    GameEvent::Notice(notice) => self.toast(&notice.to_string()),
                }
            }
        }

        fn toast(&mut self, text: &str) {
            let Some(el) = self.element("toast") else {
                log::info!("{}", text);
                return;
            };
            el.set_text_content(Some(text));
            let _ = el.class_list().add_1("show");
            self.toast_until = platform::now_ms() + TOAST_MS;
        }

        fn update_hud(&self, round: u32, flags: &HudFlags) {
            let Some(el) = self.element("hudRound") else {
                return;
            };
            let mut text = format!(
                "Round {}/{} • {}",
                round.min(STANDARD_ROUNDS),
                STANDARD_ROUNDS,
                flags.difficulty.hud_label()
            );
            if flags.endless_on {
                text.push_str(" • ∞ Endless");
            }
            if flags.daily_on {
                text.push_str(" • Daily");
            }
            if flags.endless_on {
                text.push_str(&format!(" • ∞ Best {}", flags.endless_best));
            }
            text.push_str(if self.synth.enabled() { " 🔊" } else { " 🔇" });
            el.set_text_content(Some(&text));
        }

        fn update_replay_button(&self, flags: &HudFlags) {
            let Some(btn) = self
                .element("replayBtn")
                .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
            else {
                return;
            };
            let hidden = flags.difficulty == Difficulty::Hard;
            self.set_hidden("replayBtn", hidden);
            if hidden {
                return;
            }
            btn.set_disabled(!flags.replay_available);
            let title = match flags.difficulty {
                Difficulty::Normal if !flags.replay_available => "1 replay per round on Normal",
                Difficulty::Normal => "Replay (1 per round)",
                _ => "Replay sequence",
            };
            btn.set_title(title);
        }

        fn refresh_hud(&self) {
            let flags = self.game.hud_flags();
            self.update_hud(self.game.round(), &flags);
            self.update_replay_button(&flags);
            self.refresh_menu(&flags);
        }

        /// Mobile menu labels mirror the current settings
        fn refresh_menu(&self, flags: &HudFlags) {
            if let Some(el) = self.element("btnDiff") {
                let label = format!("Mode: {}", flags.difficulty.hud_label());
                el.set_text_content(Some(&label));
            }
            if let Some(el) = self.element("btnMute") {
                let label = if self.synth.enabled() {
                    "🔊 Sound: On"
                } else {
                    "🔇 Sound: Off"
                };
                el.set_text_content(Some(label));
            }
            if let Some(btn) = self
                .element("btnReplay")
                .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
            {
                btn.set_disabled(!flags.replay_available);
            }
            for (id, on) in [("btnEndless", flags.endless_on), ("btnDaily", flags.daily_on)] {
                if let Some(el) = self.element(id) {
                    let _ = el.class_list().toggle_with_force("on", on);
                }
            }
        }

        fn menu_open(&self) -> bool {
            self.element("mobileMenu")
                .is_some_and(|el| el.class_list().contains("open"))
        }

        fn set_menu_open(&self, open: bool) {
            let Some(menu) = self.element("mobileMenu") else {
                return;
            };
            let _ = menu.class_list().toggle_with_force("open", open);
            let _ = menu.set_attribute("aria-hidden", if open { "false" } else { "true" });
            if let Some(toggle) = self.element("menuToggle") {
                let _ = toggle.set_attribute("aria-expanded", if open { "true" } else { "false" });
            }
        }

        fn pointer_down(&mut self, event: &PointerEvent) {
            let rect = self.canvas.get_bounding_client_rect();
            let x = event.client_x() as f64 - rect.left();
            let y = event.client_y() as f64 - rect.top();
            self.game
                .submit_pointer(x as f32, y as f32, platform::now_ms());
            self.process_events();
        }

        fn key_down(&mut self, key: &str) {
            self.game.note_activity(platform::now_ms());
            match key.to_ascii_lowercase().as_str() {
                "i" => self.toggle_instructions(),
                "a" => self.cycle_difficulty(),
                "m" => self.toggle_audio(),
                "e" => self.toggle_endless(),
                "d" => self.toggle_daily(),
                "escape" => self.set_menu_open(false),
                _ => {}
            }
            self.process_events();
        }

        fn toggle_instructions(&mut self) {
            if let Some(el) = self.element("instructionsOverlay") {
                let _ = el.class_list().toggle("hidden");
            }
        }

        fn cycle_difficulty(&mut self) {
            self.game.cycle_difficulty();
        }

        fn toggle_audio(&mut self) {
            let on = self.synth.toggle();
            self.toast(if on { "Audio ON 🔊" } else { "Audio OFF 🔇" });
            self.refresh_hud();
        }

        fn toggle_endless(&mut self) {
            self.game.toggle_endless();
        }

        fn toggle_daily(&mut self) {
            self.game.toggle_daily();
        }

        fn replay_clicked(&mut self) {
            if let Err(e) = self.game.request_replay() {
                log::debug!("Replay button: {}", e);
            }
            self.process_events();
        }

        // === Drawing ===

        fn draw(&self, time: f64) {
            let field = self.field();
            let (w, h) = (field.width as f64, field.height as f64);
            let ctx = &self.ctx;

            ctx.set_fill_style_str("#05060f");
            ctx.fill_rect(0.0, 0.0, w, h);

            self.draw_hints(time);
            if let Some((target, until)) = self.blink {
                if time < until {
                    ctx.begin_path();
                    ctx.set_fill_style_str("rgba(255,240,220,0.08)");
                    let _ = ctx.arc(target.x() as f64, target.y() as f64, 6.0, 0.0, TAU);
                    ctx.fill();
                }
            }
            self.draw_effects();
        }

        fn draw_hints(&self, time: f64) {
            let ctx = &self.ctx;
            let tol = self.game.tolerance() as f64;
            let start = self.game.input_index();

            for (offset, target) in self.game.pending_targets().iter().enumerate() {
                let (x, y) = (target.x() as f64, target.y() as f64);
                match self.game.hint_style() {
                    HintStyle::Pulse => {
                        let i = (start + offset) as f64;
                        let wobble = ((time / 1000.0 + i * 0.18) * 3.0).sin() * 6.0;

                        ctx.begin_path();
                        ctx.set_stroke_style_str("rgba(255,240,200,0.25)");
                        ctx.set_line_width(2.0);
                        let _ = ctx.arc(x, y, tol + 6.0 + wobble, 0.0, TAU);
                        ctx.stroke();

                        ctx.begin_path();
                        ctx.set_stroke_style_str("rgba(255,240,200,0.12)");
                        ctx.set_line_width(1.0);
                        let _ = ctx.arc(x, y, (tol * 0.6 + wobble * 0.3).max(18.0), 0.0, TAU);
                        ctx.stroke();
                    }
                    HintStyle::Faint => {
                        ctx.begin_path();
                        ctx.set_stroke_style_str("rgba(255,240,200,0.15)");
                        ctx.set_line_width(1.0);
                        let _ = ctx.arc(x, y, tol * 0.6, 0.0, TAU);
                        ctx.stroke();
                    }
                    HintStyle::Hidden => return,
                }
            }
        }

        fn draw_effects(&self) {
            let ctx = &self.ctx;
            for e in self.effects.iter() {
                let t = e.fade();
                let (x, y) = (e.pos.x as f64, e.pos.y as f64);
                match e.kind {
                    EffectKind::Pulse { tint } => {
                        ctx.begin_path();
                        ctx.set_fill_style_str(&tint.css(0.18 * t));
                        let _ = ctx.arc(x, y, ((1.0 - t) * 60.0 + 20.0) as f64, 0.0, TAU);
                        ctx.fill();
                    }
                    EffectKind::Spark { tint, .. } => {
                        ctx.begin_path();
                        ctx.set_fill_style_str(&tint.css(0.85 * t));
                        let _ = ctx.arc(x, y, (1.8 + 1.2 * t) as f64, 0.0, TAU);
                        ctx.fill();
                    }
                    EffectKind::Confetti { hue, .. } => {
                        let s = (2.0 + 2.5 * t) as f64;
                        ctx.save();
                        let _ = ctx.translate(x, y);
                        let _ = ctx.rotate(e.age_ms as f64 * 0.01);
                        ctx.set_fill_style_str(&format!("hsla({},95%,60%,{:.3})", hue, 0.9 * t));
                        ctx.fill_rect(-s / 2.0, -s / 2.0, s, s);
                        ctx.restore();
                    }
                }
            }
        }
    }

    /// Light haptics, skipped for reduced-motion users
    fn vibrate(pattern: &[u32]) {
        if pattern.is_empty() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let reduced = window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .map(|m| m.matches())
            .unwrap_or(false);
        if reduced {
            return;
        }
        let array = js_sys::Array::new();
        for ms in pattern {
            array.push(&JsValue::from(*ms));
        }
        window.navigator().vibrate_with_pattern(&array);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Fireworks Memory starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("sky")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #sky element");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        let query = window.location().search().unwrap_or_default();
        let settings = Settings::from_query(&query);
        log::info!("Settings: {:?}", settings);

        let game = Game::from_settings(&settings, PlayField::default(), EndlessBest::load());
        let app = Rc::new(RefCell::new(App {
            game,
            effects: Effects::new(),
            synth: ToneSynth::new(settings.audio),
            canvas: canvas.clone(),
            ctx,
            document: document.clone(),
            last_time: 0.0,
            toast_until: 0.0,
            blink: None,
            started: false,
            pending_start: false,
        }));
        {
            let mut a = app.borrow_mut();
            a.fit_canvas();
            a.refresh_hud();
        }

        setup_canvas_input(&canvas, app.clone());
        setup_keyboard(app.clone());
        setup_buttons(&document, app.clone());
        setup_mobile_menu(&document, app.clone());
        setup_resize(app.clone());

        app.borrow_mut().toast(TIPS);
        // No intro screen on the page: play right away
        if document.get_element_by_id("intro").is_none() {
            app.borrow_mut().start(false);
        }

        request_animation_frame(app);
        log::info!("Fireworks Memory running!");
    }

    fn setup_canvas_input(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                app.borrow_mut().pointer_down(&event);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Any movement counts as activity for the hard-mode blink
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().game.note_activity(platform::now_ms());
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            app.borrow_mut().key_down(&event.key());
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            event.stop_propagation();
            handler();
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        // Intro -> instructions -> "Got it" starts round 1
        {
            let app = app.clone();
            on_click(document, "intro", move || {
                let mut a = app.borrow_mut();
                a.set_hidden("intro", true);
                a.set_hidden("instructionsOverlay", false);
                a.pending_start = true;
            });
        }
        {
            let app = app.clone();
            on_click(document, "closeInstructions", move || {
                let mut a = app.borrow_mut();
                a.set_hidden("instructionsOverlay", true);
                if a.pending_start && !a.started {
                    a.start(false);
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "replayBtn", move || {
                let mut a = app.borrow_mut();
                a.game.note_activity(platform::now_ms());
                a.replay_clicked();
            });
        }
        on_click(document, "playAgainBtn", move || {
            app.borrow_mut().start(true);
        });
    }

    /// Hamburger menu for narrow screens: each entry runs its action and closes the menu
    fn setup_mobile_menu(document: &Document, app: Rc<RefCell<App>>) {
        if document.get_element_by_id("mobileMenu").is_none() {
            return;
        }
        {
            let app = app.clone();
            on_click(document, "menuToggle", move || {
                let a = app.borrow();
                let open = a.menu_open();
                a.set_menu_open(!open);
            });
        }

        let actions: [(&str, fn(&mut App)); 6] = [
            ("btnDiff", App::cycle_difficulty),
            ("btnMute", App::toggle_audio),
            ("btnReplay", App::replay_clicked),
            ("btnEndless", App::toggle_endless),
            ("btnDaily", App::toggle_daily),
            ("btnInfo", App::toggle_instructions),
        ];
        for (id, action) in actions {
            let app = app.clone();
            on_click(document, id, move || {
                let mut a = app.borrow_mut();
                a.game.note_activity(platform::now_ms());
                action(&mut *a);
                a.process_events();
                a.refresh_hud();
                a.set_menu_open(false);
            });
        }

        // Clicks outside the menu close it
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            let a = app.borrow();
            if !a.menu_open() {
                return;
            }
            let Some(wrap) = a.element("mobileMenuWrap") else {
                return;
            };
            let inside = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Node>().ok())
                .is_some_and(|node| wrap.contains(Some(&node)));
            if !inside {
                a.set_menu_open(false);
            }
        });
        let _ = window.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            a.fit_canvas();
            let wide = web_sys::window()
                .and_then(|w| w.inner_width().ok())
                .and_then(|v| v.as_f64())
                .is_some_and(|w| w > MENU_BREAKPOINT_PX);
            if wide {
                a.set_menu_open(false);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;

    use fireworks_memory::sim::{Game, GameEvent, Notice, Phase, PlayField};
    use fireworks_memory::{EndlessBest, Settings};

    /// Simulated frame length
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after this much virtual time
    const MAX_VIRTUAL_MS: f64 = 60.0 * 60.0 * 1000.0;

    /// Command line options
    #[derive(Debug)]
    pub struct Options {
        pub settings: Settings,
        /// Stop once this round is reached (endless runs)
        pub rounds: u32,
        /// Deliberate wrong taps to make along the way
        pub misses: u32,
    }

    impl Options {
        /// `fireworks-memory [QUERY] [--rounds N] [--misses N]`
        pub fn parse(args: impl IntoIterator<Item = String>) -> Self {
            let mut opts = Options {
                settings: Settings::default(),
                rounds: 15,
                misses: 0,
            };
            let mut args = args.into_iter();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--rounds" => {
                        if let Some(n) = args.next().and_then(|v| v.parse().ok()) {
                            opts.rounds = n;
                        }
                    }
                    "--misses" => {
                        if let Some(n) = args.next().and_then(|v| v.parse().ok()) {
                            opts.misses = n;
                        }
                    }
                    query => opts.settings = Settings::from_query(query),
                }
            }
            opts
        }
    }

    /// Play a game to the end and return it
    pub fn run(opts: &Options) -> Game {
        let mut game = Game::from_settings(
            &opts.settings,
            PlayField::new(1280.0, 720.0),
            EndlessBest::load(),
        );
        let mut misses_left = opts.misses;
        let mut victory_shown = false;

        game.start_game();
        while game.now_ms() < MAX_VIRTUAL_MS {
            game.advance(FRAME_MS);
            for event in game.drain_events() {
                log_event(&event);
                if event == GameEvent::Notice(Notice::VictoryShown) {
                    victory_shown = true;
                }
            }
            if victory_shown || game.round() > opts.rounds {
                break;
            }
            if game.phase() != Phase::Input {
                continue;
            }

            let Some(expected) = game.state().expected_target().copied() else {
                continue;
            };
            // Miss on the last target of a round so earlier taps are exercised
            let last = game.input_index() + 1 == game.sequence().len();
            let aim = if misses_left > 0 && last && game.round() > 1 {
                misses_left -= 1;
                expected.pos + Vec2::new(300.0, 300.0)
            } else {
                expected.pos + Vec2::new(3.0, -2.0)
            };
            let now = game.now_ms();
            let outcome = game.submit_pointer(aim.x, aim.y, now);
            log::debug!("Tap at ({:.0}, {:.0}): {:?}", aim.x, aim.y, outcome);
            for event in game.drain_events() {
                log_event(&event);
            }
        }
        game
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::Notice(n) => log::info!("{}", n),
            GameEvent::RoundStateChanged { phase, round, .. } => {
                log::info!("[{} round {}]", phase.as_str(), round)
            }
            other => log::debug!("{:?}", other),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use fireworks_memory::sim::Difficulty;

        fn opts(args: &[&str]) -> Options {
            Options::parse(args.iter().map(|s| s.to_string()))
        }

        #[test]
        fn test_parse_options() {
            let o = opts(&["?difficulty=hard&endless=1", "--rounds", "12", "--misses", "2"]);
            assert_eq!(o.settings.difficulty, Difficulty::Hard);
            assert!(o.settings.endless);
            assert_eq!(o.rounds, 12);
            assert_eq!(o.misses, 2);
        }

        #[test]
        fn test_autopilot_wins_standard_game() {
            let o = opts(&["difficulty=normal", "--misses", "2"]);
            let game = run(&o);
            assert_eq!(game.phase(), Phase::Victory);
            assert_eq!(game.round(), 10);
            assert_eq!(game.sequence().len(), 10);
        }

        #[test]
        fn test_autopilot_endless_stops_at_round_limit() {
            let o = opts(&["endless=1", "--rounds", "11"]);
            let game = run(&o);
            assert_eq!(game.round(), 12);
            assert_ne!(game.phase(), Phase::Victory);
            assert_eq!(game.endless_best(), 12);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fireworks Memory (native autopilot) starting...");

    let opts = autopilot::Options::parse(std::env::args().skip(1));
    log::info!("Options: {:?}", opts);
    let game = autopilot::run(&opts);

    match serde_json::to_string_pretty(game.state()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode final state: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
