use anyhow::{bail, Context, Result};
use chrono::Datelike;
use praise_sticker::celebration::CelebrationState;
use praise_sticker::models::NewChallenge;
use praise_sticker::{calendar, challenges, dates, db, stats, stickers, App, Config};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;
    praise_sticker::init_tracing(&config);

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let mut app = match App::open(config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("failed to open sticker store: {}", e);
            return Err(e.into());
        }
    };

    match args[1].as_str() {
        "challenges" => {
            list_challenges(&app).await?;
        }
        "packs" => {
            list_packs(&app).await?;
        }
        "board" => {
            let Some(id) = args.get(2) else {
                println!("usage: inspect board <challenge-id>");
                return Ok(());
            };
            let board = app.open_board(id).await?;
            println!("{}", serde_json::to_string_pretty(&board.view(Instant::now()))?);
        }
        "calendar" => {
            let today = app.today();
            let year = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(today.year());
            let month = args
                .get(3)
                .and_then(|s| s.parse().ok())
                .unwrap_or(today.month());
            show_calendar(&app, year, month).await?;
        }
        "day" => {
            let date = match args.get(2) {
                Some(s) => dates::parse_date(s)?,
                None => app.today(),
            };
            let detail = calendar::get_day_detail(&app.pool, date).await?;
            println!("{} - {} stickers", dates::format_date(date), detail.total_stickers);
            for log in detail.logs {
                println!("  {} sticker {}", log.challenge_id, log.sticker_id);
            }
        }
        "stats" => {
            let stats = stats::get_user_stats(&app.pool, app.clock.as_ref()).await?;
            println!("total stickers: {}", stats.total_stickers);
            println!("current streak: {}", stats.current_streak);
            println!("longest streak: {}", stats.longest_streak);
            println!("challenges: {}", stats.total_challenges);
        }
        "create" => {
            let Some(title) = args.get(2) else {
                println!("usage: inspect create <title> [days] [reward]");
                return Ok(());
            };
            let days: u32 = match args.get(3) {
                Some(s) => s
                    .parse()
                    .with_context(|| format!("days must be a number, got {:?}", s))?,
                None => catalog::DEFAULT_CHALLENGE_DAYS,
            };
            if !catalog::is_preset_duration(days) {
                println!(
                    "note: {} is not one of the preset durations {:?}",
                    days,
                    catalog::CHALLENGE_DURATIONS
                );
            }
            let mut input =
                NewChallenge::new(title.as_str(), catalog::DEFAULT_CHALLENGE_ICON, days);
            if let Some(reward) = args.get(4) {
                input = input.with_reward(reward.as_str());
            }
            let challenge =
                challenges::create_challenge(&app.pool, app.clock.as_ref(), input).await?;
            println!("created {} ({} days)", challenge.id, challenge.days);
        }
        "presets" => {
            println!("icons: {}", catalog::CHALLENGE_ICONS.join(" "));
            println!("durations: {:?}", catalog::CHALLENGE_DURATIONS);
        }
        "place" => {
            let Some(id) = args.get(2) else {
                println!("usage: inspect place <challenge-id>");
                return Ok(());
            };
            let mut board = app.open_board(id).await?;
            match board.place_today(&app, Instant::now()).await {
                Ok(_) => {
                    let view = board.view(Instant::now());
                    println!("placed: {}", view.progress.progress_text);
                    if let CelebrationState::Visible(c) = view.celebration {
                        println!("{} {}", c.message.icon, c.message.title);
                        println!("{}", c.message.description);
                        if let Some(reward) = c.reward {
                            println!("reward: {}", reward);
                        }
                    }
                }
                Err(e) if e.is_recoverable() => println!("{}", e),
                Err(e) => return Err(e.into()),
            }
        }
        "unplace" => {
            let Some(id) = args.get(2) else {
                println!("usage: inspect unplace <challenge-id>");
                return Ok(());
            };
            let mut board = app.open_board(id).await?;
            match board.remove_today(&app, Instant::now()).await {
                Ok(_) => println!("removed today's sticker: {}", board.progress().progress_text),
                Err(e) if e.is_recoverable() => println!("{}", e),
                Err(e) => return Err(e.into()),
            }
        }
        "delete" => {
            let Some(id) = args.get(2) else {
                println!("usage: inspect delete <challenge-id>");
                return Ok(());
            };
            app.delete_challenge(id).await?;
            println!("deleted {}", id);
        }
        "reset" => {
            if args.get(2).map(String::as_str) != Some("--yes") {
                bail!("reset deletes every challenge and log; rerun with --yes");
            }
            db::reset_database(&app.pool).await?;
            println!("database reset");
        }
        _ => {
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("praise sticker store inspector");
    println!();
    println!("usage:");
    println!("  inspect challenges                      - list challenges with progress");
    println!("  inspect packs                           - list sticker packs");
    println!("  inspect board <id>                      - dump a challenge board as json");
    println!("  inspect calendar [year] [month]         - show a month of stickers");
    println!("  inspect day [yyyy-mm-dd]                - show one day's stickers");
    println!("  inspect stats                           - show overall stats");
    println!("  inspect create <title> [days] [reward]  - create a challenge");
    println!("  inspect presets                         - list challenge icons and durations");
    println!("  inspect place <id>                      - place today's sticker");
    println!("  inspect unplace <id>                    - remove today's sticker");
    println!("  inspect delete <id>                     - delete a challenge");
    println!("  inspect reset --yes                     - wipe and reseed the store");
}

async fn list_challenges(app: &App) -> Result<()> {
    let summaries = challenges::list_challenges_with_progress(&app.pool).await?;
    if summaries.is_empty() {
        println!("no challenges yet");
        return Ok(());
    }

    println!("challenges:");
    for summary in summaries {
        let c = &summary.challenge;
        let done = if summary.progress.is_completed() { " (done)" } else { "" };
        println!(
            "  {} {} {} - {}{}",
            c.id, c.icon, c.title, summary.progress.progress_text, done
        );
        if let Some(reward) = &c.reward {
            println!("      reward: {}", reward);
        }
    }
    Ok(())
}

async fn list_packs(app: &App) -> Result<()> {
    for entry in stickers::get_packs_with_stickers(&app.pool).await? {
        println!("{} ({} stickers)", entry.pack.name, entry.stickers.len());
        for sticker in entry.stickers {
            println!("  {} {} {}", sticker.id, sticker.kind, sticker.data);
        }
    }
    Ok(())
}

async fn show_calendar(app: &App, year: i32, month: u32) -> Result<()> {
    let view = calendar::load_calendar_view(&app.pool, app.clock.as_ref(), year, month).await?;

    println!("{:04}-{:02}:", view.year, view.month);
    println!("  stickers: {}", view.total_stickers);
    println!("  active days: {}", view.active_days);
    println!("  this week: {}", view.weekly_count);
    println!("  streak: {}", view.streak);

    for mark in view.marks {
        let shape = match (mark.span_start, mark.span_end) {
            _ if !mark.has_stickers() => "  ",
            (true, true) => "()",
            (true, false) => "(-",
            (false, true) => "-)",
            (false, false) => "--",
        };
        let today = if mark.is_today { " <- today" } else { "" };
        println!(
            "  {} {} {}{}",
            dates::format_date(mark.date),
            shape,
            mark.sticker_count,
            today
        );
    }
    Ok(())
}
