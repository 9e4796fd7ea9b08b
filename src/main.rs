//! Flappy Sky entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, TouchEvent};

    use flappy_sky::audio::WebAudio;
    use flappy_sky::consts::{LEADERBOARD_TOP_K, SIM_DT};
    use flappy_sky::error::StoreError;
    use flappy_sky::leaderboard::{
        self, LeaderboardEntry, LeaderboardStore, LocalLeaderboard, RestLeaderboard,
    };
    use flappy_sky::persistence::{KeyValueStore, LocalStorage, MemoryStore};
    use flappy_sky::render::{CanvasPainter, Overlay, Scene};
    use flappy_sky::sim::{GameMode, Qualification};
    use flappy_sky::{App, DifficultyLevel, StoreRequest, TimeFilter};

    /// Leaderboard endpoint baked in at build time; without it scores stay local
    const LEADERBOARD_URL: Option<&str> = option_env!("FLAPPY_LEADERBOARD_URL");
    const LEADERBOARD_KEY: Option<&str> = option_env!("FLAPPY_LEADERBOARD_KEY");

    type Store = Rc<dyn KeyValueStore>;

    /// Whichever leaderboard this build talks to
    enum Board {
        Rest(RestLeaderboard),
        Local(LocalLeaderboard<Store>),
    }

    impl LeaderboardStore for Board {
        async fn submit(&self, name: &str, score: u32) -> Result<LeaderboardEntry, StoreError> {
            match self {
                Board::Rest(b) => b.submit(name, score).await,
                Board::Local(b) => b.submit(name, score).await,
            }
        }

        async fn fetch_top(
            &self,
            k: usize,
            filter: TimeFilter,
        ) -> Result<Vec<LeaderboardEntry>, StoreError> {
            match self {
                Board::Rest(b) => b.fetch_top(k, filter).await,
                Board::Local(b) => b.fetch_top(k, filter).await,
            }
        }

        async fn fetch_global_best(&self) -> Result<u32, StoreError> {
            match self {
                Board::Rest(b) => b.fetch_global_best().await,
                Board::Local(b) => b.fetch_global_best().await,
            }
        }
    }

    /// Game instance holding all state
    struct Shell {
        app: App<Store, WebAudio>,
        painter: CanvasPainter,
        board: Rc<Board>,
        last_time: f64,
        /// Overlay shown last frame, to avoid rebuilding the DOM every frame
        last_overlay: Option<Overlay>,
    }

    type Handle = Rc<RefCell<Shell>>;

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn difficulty_button_id(level: DifficultyLevel) -> &'static str {
        match level {
            DifficultyLevel::Easy => "difficulty-easy",
            DifficultyLevel::Normal => "difficulty-normal",
            DifficultyLevel::Hard => "difficulty-hard",
        }
    }

    fn filter_button_id(filter: TimeFilter) -> &'static str {
        match filter {
            TimeFilter::All => "filter-all",
            TimeFilter::Daily => "filter-daily",
            TimeFilter::Weekly => "filter-weekly",
            TimeFilter::Monthly => "filter-monthly",
        }
    }

    /// Update HUD elements and overlays in the DOM
    fn update_dom(shell: &mut Shell, scene: &Scene) {
        let Some(document) = document() else { return };

        set_text(&document, "hud-best", &scene.hud.best_local.to_string());
        let global = scene
            .hud
            .best_global
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string());
        set_text(&document, "hud-global", &global);

        if shell.last_overlay.as_ref() == Some(&scene.overlay) {
            return;
        }

        let active = scene.overlay.element_id();
        for id in Overlay::ELEMENT_IDS {
            set_visible(&document, id, active == Some(id));
        }

        match &scene.overlay {
            Overlay::Countdown { label } => set_text(&document, "countdown", label),
            Overlay::GameOver {
                score,
                qualification,
            } => {
                set_text(&document, "final-score", &score.to_string());
                let status = match qualification {
                    Qualification::Pending => "Checking leaderboard...",
                    Qualification::NotQualified => "",
                    Qualification::Unknown => "Leaderboard unavailable",
                };
                set_text(&document, "qualification-status", status);
            }
            Overlay::NameEntry { score, submitting } => {
                set_text(&document, "entry-score", &score.to_string());
                set_text(
                    &document,
                    "entry-status",
                    if *submitting { "Submitting..." } else { "" },
                );
            }
            Overlay::Settings { level } => {
                for other in DifficultyLevel::ALL {
                    if let Some(el) = document.get_element_by_id(difficulty_button_id(other)) {
                        let class = if other == *level { "selected" } else { "" };
                        let _ = el.set_attribute("class", class);
                    }
                }
            }
            Overlay::Leaderboard {
                filter,
                rows,
                after_game,
            } => {
                set_visible(&document, "play-again-from-board-btn", *after_game);
                for other in TimeFilter::ALL {
                    if let Some(el) = document.get_element_by_id(filter_button_id(other)) {
                        let class = if other == *filter { "selected" } else { "" };
                        let _ = el.set_attribute("class", class);
                    }
                }
                if let Some(list) = document.get_element_by_id("leaderboard-rows") {
                    let now = leaderboard::now_ms();
                    list.set_text_content(None);
                    for row in rows {
                        if let Ok(li) = document.create_element("li") {
                            li.set_text_content(Some(&format!(
                                "{}. {} - {} ({})",
                                row.rank,
                                row.name,
                                row.score,
                                leaderboard::format_age(row.submitted_at, now)
                            )));
                            let _ = list.append_child(&li);
                        }
                    }
                    if rows.is_empty() {
                        list.set_text_content(Some("No scores yet"));
                    }
                }
            }
            Overlay::None | Overlay::Title => {}
        }

        shell.last_overlay = Some(scene.overlay.clone());
    }

    /// Run queued leaderboard work in the background
    fn pump(handle: &Handle) {
        let (requests, board) = {
            let mut shell = handle.borrow_mut();
            (shell.app.take_requests(), shell.board.clone())
        };

        for request in requests {
            let handle = handle.clone();
            let board = board.clone();
            spawn_local(async move {
                match request {
                    StoreRequest::CheckQualification { session_id } => {
                        let top = board.fetch_top(LEADERBOARD_TOP_K, TimeFilter::Daily).await;
                        let result = handle.borrow_mut().app.resolve_qualification(session_id, top);
                        if let Err(err) = result {
                            log::debug!("Qualification dropped: {}", err);
                        }
                    }
                    StoreRequest::Submit(submission) => {
                        let top = match board.submit(&submission.name, submission.score).await {
                            Ok(_) => board.fetch_top(LEADERBOARD_TOP_K, TimeFilter::All).await,
                            Err(err) => Err(err),
                        };
                        let result = handle
                            .borrow_mut()
                            .app
                            .complete_submission(submission.session_id, top);
                        if let Err(err) = result {
                            log::debug!("Submission result dropped: {}", err);
                        }
                    }
                    StoreRequest::FetchTop(filter) => {
                        let top = board.fetch_top(LEADERBOARD_TOP_K, filter).await;
                        handle.borrow_mut().app.deliver_leaderboard(filter, top);
                    }
                    StoreRequest::FetchGlobalBest => {
                        let best = board.fetch_global_best().await;
                        handle.borrow_mut().app.deliver_global_best(best);
                    }
                }
                pump(&handle);
            });
        }
    }

    /// Run a command against the app, then flush any store work it queued
    fn command<T, E: std::fmt::Display>(
        handle: &Handle,
        f: impl FnOnce(&mut App<Store, WebAudio>) -> Result<T, E>,
    ) {
        let result = {
            let mut shell = handle.borrow_mut();
            shell.app.audio().resume();
            f(&mut shell.app)
        };
        if let Err(err) = result {
            log::debug!("Ignored input: {}", err);
        }
        pump(handle);
    }

    /// Primary action: flap, start, or restart depending on the mode
    fn primary(handle: &Handle) {
        let mode = handle.borrow().app.game().mode();
        match mode {
            GameMode::Idle | GameMode::Running | GameMode::GameOver { .. } => {
                command(handle, |app| app.jump())
            }
            _ => {}
        }
    }

    /// Escape: leave whatever screen is up
    fn back(handle: &Handle) {
        let mode = handle.borrow().app.game().mode();
        match mode {
            GameMode::Countdown { .. } => command(handle, |app| app.cancel_countdown()),
            GameMode::GameOver { .. } | GameMode::ScoreSubmission { .. } => {
                command(handle, |app| app.back_to_home())
            }
            GameMode::LeaderboardView { .. } => command(handle, |app| app.close_leaderboard()),
            GameMode::Settings => command(handle, |app| app.close_settings()),
            _ => {}
        }
    }

    fn on_click(document: &Document, id: &str, handle: &Handle, f: fn(&Handle)) {
        if let Some(btn) = document.get_element_by_id(id) {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                f(&handle);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn submit_typed_name(handle: &Handle) {
        let name = document()
            .and_then(|d| d.get_element_by_id("name-input"))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();
        let rejected = {
            let mut shell = handle.borrow_mut();
            shell.app.submit_name(&name).err()
        };
        if let Some(err) = rejected {
            log::info!("Name rejected: {}", err);
            if let Some(document) = document() {
                set_text(&document, "entry-status", &err.to_string());
            }
        }
        pump(handle);
    }

    fn setup_buttons(document: &Document, handle: &Handle) {
        on_click(document, "start-btn", handle, primary);
        on_click(document, "play-again-btn", handle, |h| command(h, |app| app.play_again()));
        on_click(document, "play-again-from-board-btn", handle, |h| {
            command(h, |app| app.play_again())
        });
        on_click(document, "home-btn", handle, |h| command(h, |app| app.back_to_home()));
        on_click(document, "skip-entry-btn", handle, |h| command(h, |app| app.back_to_home()));
        on_click(document, "leaderboard-btn", handle, |h| {
            command(h, |app| app.open_leaderboard(TimeFilter::All))
        });
        on_click(document, "close-leaderboard-btn", handle, |h| {
            command(h, |app| app.close_leaderboard())
        });
        on_click(document, "settings-btn", handle, |h| command(h, |app| app.open_settings()));
        on_click(document, "close-settings-btn", handle, |h| {
            command(h, |app| app.close_settings())
        });
        on_click(document, "submit-name-btn", handle, submit_typed_name);

        on_click(document, "filter-all", handle, |h| {
            command(h, |app| app.set_leaderboard_filter(TimeFilter::All))
        });
        on_click(document, "filter-daily", handle, |h| {
            command(h, |app| app.set_leaderboard_filter(TimeFilter::Daily))
        });
        on_click(document, "filter-weekly", handle, |h| {
            command(h, |app| app.set_leaderboard_filter(TimeFilter::Weekly))
        });
        on_click(document, "filter-monthly", handle, |h| {
            command(h, |app| app.set_leaderboard_filter(TimeFilter::Monthly))
        });

        on_click(document, "difficulty-easy", handle, |h| {
            command(h, |app| app.select_difficulty(DifficultyLevel::Easy))
        });
        on_click(document, "difficulty-normal", handle, |h| {
            command(h, |app| app.select_difficulty(DifficultyLevel::Normal))
        });
        on_click(document, "difficulty-hard", handle, |h| {
            command(h, |app| app.select_difficulty(DifficultyLevel::Hard))
        });
        on_click(document, "mute-btn", handle, |h| {
            let muted = h.borrow().app.settings().muted;
            h.borrow_mut().app.set_muted(!muted);
        });
        on_click(document, "clouds-btn", handle, |h| {
            let show = h.borrow().app.settings().show_clouds;
            h.borrow_mut().app.set_show_clouds(!show);
        });
        on_click(document, "motion-btn", handle, |h| {
            let reduced = h.borrow().app.settings().reduced_motion;
            h.borrow_mut().app.set_reduced_motion(!reduced);
        });
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, handle: &Handle) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Mouse click
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                primary(&handle);
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                primary(&handle);
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                // Typing a name must not flap the bird
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                match event.key().as_str() {
                    "Enter" if typing => submit_typed_name(&handle),
                    _ if typing => {}
                    " " | "ArrowUp" => {
                        event.prevent_default();
                        primary(&handle);
                    }
                    "Escape" => back(&handle),
                    "a" | "A" => {
                        let on = !handle.borrow().app.game().autopilot();
                        handle.borrow_mut().app.set_autopilot(on);
                    }
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_auto_suspend(handle: &Handle) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let handle = handle.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut shell = handle.borrow_mut();
                shell.app.set_suspended(hidden);
                // Don't count the hidden time as one huge frame
                shell.last_time = 0.0;
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur/focus (click outside)
        for (event, suspended) in [("blur", true), ("focus", false)] {
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut shell = handle.borrow_mut();
                shell.app.set_suspended(suspended);
                shell.last_time = 0.0;
            });
            window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(handle: Handle) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(handle, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(handle: Handle, time: f64) {
        {
            let mut shell = handle.borrow_mut();

            // Calculate delta time
            let dt = if shell.last_time > 0.0 {
                ((time - shell.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            shell.last_time = time;

            shell.app.frame(dt);
            let scene = shell.app.scene();
            shell.painter.paint(&scene);
            update_dom(&mut shell, &scene);
        }

        pump(&handle);
        request_animation_frame(handle);
    }

    fn open_store() -> Store {
        match LocalStorage::open() {
            Some(storage) => Rc::new(storage),
            None => {
                log::warn!("localStorage unavailable - nothing will persist");
                Rc::new(MemoryStore::new())
            }
        }
    }

    fn open_board(store: Store) -> Board {
        match (LEADERBOARD_URL, LEADERBOARD_KEY) {
            (Some(url), Some(key)) => {
                log::info!("Using online leaderboard at {}", url);
                Board::Rest(RestLeaderboard::new(url, key))
            }
            _ => {
                log::info!("No leaderboard endpoint configured - using local leaderboard");
                Board::Local(LocalLeaderboard::new(store))
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Flappy Sky starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        set_visible(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        canvas.set_width((canvas.client_width() as f64 * dpr) as u32);
        canvas.set_height((canvas.client_height() as f64 * dpr) as u32);
        let painter = CanvasPainter::new(&canvas)?;

        let store = open_store();
        let board = Rc::new(open_board(store.clone()));
        let seed = leaderboard::now_ms() as u64;
        let app = App::new(store, WebAudio::new(), seed);

        let handle = Rc::new(RefCell::new(Shell {
            app,
            painter,
            board,
            last_time: 0.0,
            last_overlay: None,
        }));

        // Resize handler
        {
            let handle = handle.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
                canvas_clone.set_width((canvas_clone.client_width() as f64 * dpr) as u32);
                canvas_clone.set_height((canvas_clone.client_height() as f64 * dpr) as u32);
                handle.borrow_mut().painter.resize(&canvas_clone);
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        setup_input_handlers(&canvas, &handle)?;
        setup_buttons(&document, &handle);
        setup_auto_suspend(&handle)?;

        set_visible(&document, "hud", true);

        // Start game loop
        pump(&handle);
        request_animation_frame(handle);

        log::info!("Flappy Sky running!");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Flappy Sky (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    let level = std::env::args()
        .nth(2)
        .and_then(|s| flappy_sky::DifficultyLevel::from_str(&s))
        .unwrap_or_default();

    let score = headless_demo(seed, level);
    println!("Autopilot scored {} on {} (seed {})", score, level.as_str(), seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Let the autopilot play one game at a fixed frame rate
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(seed: u64, level: flappy_sky::DifficultyLevel) -> u32 {
    use flappy_sky::audio::Silent;
    use flappy_sky::consts::SIM_DT;
    use flappy_sky::persistence::MemoryStore;
    use flappy_sky::sim::{GameEvent, GameMode};

    /// Stop the demo after this many ticks even if the bird is still alive
    const MAX_DEMO_TICKS: u64 = 50 * 60 * 5;

    let mut app = flappy_sky::App::new(MemoryStore::new(), Silent, seed);
    if let Err(err) = app.select_difficulty(level) {
        log::warn!("Could not select difficulty: {}", err);
    }
    app.set_autopilot(true);
    if let Err(err) = app.jump() {
        log::error!("Could not start: {}", err);
        return 0;
    }

    while app.game().mode() == GameMode::Running && app.game().session().time_ticks < MAX_DEMO_TICKS {
        for event in app.frame(SIM_DT) {
            match event {
                GameEvent::Scored(score) => log::info!("Score: {}", score),
                GameEvent::SpeedUp(speed) => log::info!("Speed up: {:.1}", speed),
                _ => {}
            }
        }
    }

    app.game().score().current
}
