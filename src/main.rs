//! Pop Arena entry point
//!
//! The browser build is driven from JS through `pop_arena::web::WebGame`.
//! Natively this plays one headless round with an auto-tapper and logs what
//! the presenter would have drawn.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use pop_arena::sim::{Game, ItemId, RoundStatus, SpawnedItem, SpriteKind};
    use pop_arena::{Controls, Presenter, Sound};

    /// Frame step for the simulated host loop
    const FRAME_MS: u64 = 50;
    /// How long the auto-tapper waits before hitting a new item
    const REACTION_MS: u64 = 600;

    /// Presenter that narrates to the log
    #[derive(Default)]
    struct LogPresenter;

    impl Presenter for LogPresenter {
        fn render_item(&mut self, item: &SpawnedItem, sprite: Option<&SpriteKind>) {
            let art = sprite.map_or("placeholder", |s| s.image.as_str());
            log::info!(
                "+ item {} type {} at ({:.1}%, {:.1}%) [{}]",
                item.id,
                item.type_index,
                item.pos.x,
                item.pos.y,
                art
            );
        }

        fn remove_item(&mut self, id: ItemId) {
            log::debug!("- item {}", id);
        }

        fn show_floating_text(&mut self, _pos: Vec2, text: &str, positive: bool) {
            log::info!("{} {}", if positive { "✓" } else { "✗" }, text);
        }

        fn play_hit_effect(&mut self, type_index: usize, _pos: Vec2, effect: &str) {
            log::debug!("effect {} for type {}", effect, type_index);
        }

        fn update_score_display(&mut self, score: i64) {
            log::debug!("score {}", score);
        }

        fn update_time_display(&mut self, time: &str) {
            log::debug!("time {}", time);
        }

        fn show_end_overlay(&mut self, final_score: i64) {
            log::info!("=== Final score: {} ===", final_score);
        }

        fn hide_end_overlay(&mut self) {}

        fn show_start_overlay(&mut self) {}

        fn hide_start_overlay(&mut self) {}

        fn set_controls(&mut self, _controls: Controls) {}

        fn play_sound(&mut self, sound: Sound, volume: f32) {
            log::trace!("sound {:?} @ {:.2}", sound, volume);
        }

        fn pause_music(&mut self) {}
    }

    pub fn run(seed: u64) -> i64 {
        let mut game = Game::new(LogPresenter, seed);
        log::info!("Headless round with seed {}", seed);

        let mut now = 0;
        game.start(now);
        while game.status() == RoundStatus::Running {
            now += FRAME_MS;
            game.advance(now);

            // Tap everything that has been visible long enough, skipping
            // the penalty sprite
            let ready: Vec<ItemId> = game
                .items()
                .iter()
                .filter(|item| now >= item.created_at_ms + REACTION_MS)
                .filter(|item| game.tuning().sprites.delta(item.type_index) > 0)
                .map(|item| item.id)
                .collect();
            for id in ready {
                game.tap(id, now);
            }
        }
        game.score()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(e) => {
                eprintln!("invalid seed {:?}: {}", arg, e);
                std::process::exit(2);
            }
        },
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default(),
    };

    let score = headless::run(seed);
    println!("Final score: {}", score);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is pop_arena::web::wasm_start, this is just to satisfy the compiler
}
