//! Mighty Orb - headless runner
//!
//! Drives a full session against the reference rigid body with a small
//! autopilot and a host-side overlap sensor, then logs the result.
//!
//! Usage: mighty-orb [--tuning <PATH>] [--settings <PATH>] [--seconds <SECS>]

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;
    use std::path::PathBuf;

    use clap::Parser;

    use glam::Vec3;
    use mighty_orb::collab::Collaborators;
    use mighty_orb::sim::{
        Contact, FrameControls, FrameInput, GameEvent, GameSession, RevivePhase, RigidBody,
        SpawnKind,
    };
    use mighty_orb::{RunnerTuning, Settings};

    const FRAME_DT: f32 = 1.0 / 60.0;
    const ORB_RADIUS: f32 = 0.5;
    /// Orb radius plus the half-size of a pickup or obstacle
    const SENSOR_RADIUS: f32 = 0.75;
    /// Jump when an obstacle in our lane is this close ahead
    const JUMP_LOOKAHEAD: f32 = 3.0;

    /// Mighty Orb headless runner
    #[derive(Parser, Debug)]
    #[command(name = "mighty-orb")]
    #[command(version, about = "Run a Mighty Orb session with an autopilot", long_about = None)]
    pub struct Cli {
        /// Tuning JSON (defaults to the built-in balance)
        #[arg(short, long)]
        pub tuning: Option<PathBuf>,

        /// Settings JSON with the control preference
        #[arg(short, long)]
        pub settings: Option<PathBuf>,

        /// Simulated seconds to run before stopping
        #[arg(long, default_value_t = 120.0)]
        pub seconds: f32,

        /// Session seed
        #[arg(long, default_value_t = 0x5EED)]
        pub seed: u64,
    }

    /// Overlaps between the orb and live spawn points
    fn sense(session: &GameSession) -> Vec<Contact> {
        session
            .track()
            .live_spawns_within(session.body().position(), SENSOR_RADIUS, |_| true)
            .into_iter()
            .map(|(at, _)| Contact::Spawn(at))
            .collect()
    }

    /// Hop over obstacles straight ahead
    fn autopilot(session: &GameSession) -> FrameControls {
        let orb = session.body().position();
        let ahead = orb + Vec3::Z * (JUMP_LOOKAHEAD * 0.5);
        let threat = !session.player().invincible
            && session
                .track()
                .live_spawns_within(ahead, JUMP_LOOKAHEAD * 0.5, |k| {
                    matches!(k, SpawnKind::Obstacle(_))
                })
                .iter()
                .any(|(_, p)| (p.x - orb.x).abs() < SENSOR_RADIUS && p.z > orb.z);
        FrameControls {
            jump_held: threat && session.player().is_grounded(),
            ..Default::default()
        }
    }

    pub fn run(args: Cli) -> Result<(), Box<dyn Error>> {
        let tuning = match &args.tuning {
            Some(path) => RunnerTuning::load(path)?,
            None => RunnerTuning::default(),
        };
        let settings = match &args.settings {
            Some(path) => Settings::load_from(path)?,
            None => Settings::default(),
        };

        let body = RigidBody::orb(ORB_RADIUS, tuning.track.half_width);
        let mut session = GameSession::new(
            tuning,
            &settings,
            Collaborators::headless(),
            Box::new(body),
            args.seed,
        )?;

        let frames = (args.seconds.max(0.0) / FRAME_DT).ceil() as u64;
        let mut coins = 0;
        let mut recycled = 0;
        for _ in 0..frames {
            let input = FrameInput {
                controls: autopilot(&session),
                contacts: sense(&session),
            };
            session.frame(&input, FRAME_DT);

            for event in session.drain_events() {
                match event {
                    GameEvent::CoinCollected { .. } => coins += 1,
                    GameEvent::SegmentRecycled { .. } => recycled += 1,
                    GameEvent::PowerUpStarted(kind) => log::info!("Power-up: {:?}", kind),
                    GameEvent::PlayerDied(cause) => log::info!("Died: {:?}", cause),
                    _ => {}
                }
            }

            match session.phase() {
                RevivePhase::AwaitingRevive => session.decline_revive(),
                RevivePhase::GameOverFinal => break,
                RevivePhase::Playing => {}
            }
        }
        // Let the HUD show the final state
        session.frame(&FrameInput::default(), 0.0);

        log::info!(
            "Run finished after {:.1}s: score {}, {} coins, {} segments recycled, z={:.1}",
            session.time(),
            session.displayed_score(),
            coins,
            recycled,
            session.body().position().z
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use clap::{CommandFactory, Parser};

        #[test]
        fn test_cli_definition() {
            Cli::command().debug_assert();
        }

        #[test]
        fn test_cli_defaults() {
            let cli = Cli::try_parse_from(["mighty-orb"]).unwrap();
            assert!(cli.tuning.is_none());
            assert!(cli.settings.is_none());
            assert_eq!(cli.seconds, 120.0);
            assert_eq!(cli.seed, 0x5EED);
        }

        #[test]
        fn test_cli_seconds_without_paths() {
            let cli = Cli::try_parse_from(["mighty-orb", "--seconds", "30"]).unwrap();
            assert!(cli.tuning.is_none());
            assert_eq!(cli.seconds, 30.0);
        }

        #[test]
        fn test_cli_rejects_bare_positional() {
            assert!(Cli::try_parse_from(["mighty-orb", "30"]).is_err());
            assert!(Cli::try_parse_from(["mighty-orb", "--seconds", "soon"]).is_err());
        }

        #[test]
        fn test_cli_paths() {
            let cli = Cli::try_parse_from([
                "mighty-orb",
                "--tuning",
                "balance.json",
                "-s",
                "prefs.json",
            ])
            .unwrap();
            assert_eq!(cli.tuning, Some(PathBuf::from("balance.json")));
            assert_eq!(cli.settings, Some(PathBuf::from("prefs.json")));
        }

        #[test]
        fn test_short_run_finishes() {
            let cli = Cli::try_parse_from(["mighty-orb", "--seconds", "2"]).unwrap();
            assert!(run(cli).is_ok());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let cli = headless::Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Mighty Orb (headless) starting...");

    if let Err(err) = headless::run(cli) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build embeds the library; there is no standalone entry point
}
