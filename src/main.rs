use std::io::{self, BufRead, Write};

use flashsmart::database::{ReviewRepository, SqliteRepository};
use flashsmart::export::{export_deck, import_deck_into};
use flashsmart::models::{Clock, FixedClock, Flashcard, ReviewSession, SystemClock};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let repo = SqliteRepository::open("flashsmart.db", &SystemClock)?;

    if repo.deck_names()?.is_empty() {
        seed_sample_deck(&repo)?;
    }

    let deck_set = repo.load_all_decks()?;
    println!("Loaded {} decks from database", deck_set.decks.len());
    for deck in &deck_set.decks {
        println!("  - {} ({} cards)", deck.name, deck.flashcards.len());
    }
    println!("Study date: {}", repo.current_date()?.date_naive());
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("decks") => {
                let today = repo.current_date()?;
                for name in repo.deck_names()? {
                    let total = repo.cards_for_deck(&name)?.len();
                    let due = repo.due_cards(&name, today)?.len();
                    println!("  {}: {} cards, {} due", name, total, due);
                }
            }
            Some("add") => {
                let rest: Vec<&str> = parts.collect();
                add_card_command(&repo, &rest.join(" "))?;
            }
            Some("review") => {
                let deck_name = parts.collect::<Vec<&str>>().join(" ");
                if deck_name.is_empty() {
                    println!("Usage: review <deck>");
                } else {
                    run_review(&repo, &deck_name, &mut lines)?;
                }
            }
            Some("advance") => {
                let day = repo.advance_day()?;
                println!("Study date is now {}", day.date_naive());
            }
            Some("export") => match (parts.next(), parts.next()) {
                (Some(deck_name), Some(path)) => {
                    let deck_set = repo.load_all_decks()?;
                    match deck_set.decks.into_iter().find(|deck| deck.name == deck_name) {
                        Some(deck) => {
                            export_deck(&deck, path)?;
                            println!("Exported '{}' to {}", deck_name, path);
                        }
                        None => println!("No deck named '{}'", deck_name),
                    }
                }
                _ => println!("Usage: export <deck> <path>"),
            },
            Some("import") => match parts.next() {
                Some(path) => {
                    let now = repo.current_date()?;
                    let deck = import_deck_into(path, &repo, now)?;
                    println!("Imported '{}' ({} cards)", deck.name, deck.flashcards.len());
                }
                None => println!("Usage: import <path>"),
            },
            Some("help") => print_help(),
            Some("quit") | Some("exit") => break,
            Some(other) => println!("Unknown command '{}', try 'help'", other),
            None => {}
        }
    }

    Ok(())
}

/// `add <deck> <term> = <definition>`. The deck is created on first use.
fn add_card_command(
    repo: &SqliteRepository,
    args: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some((deck_name, card_text)) = args.split_once(' ') else {
        println!("Usage: add <deck> <term> = <definition>");
        return Ok(());
    };
    let Some((term, definition)) = card_text.split_once('=') else {
        println!("Usage: add <deck> <term> = <definition>");
        return Ok(());
    };

    repo.create_deck(deck_name)?;
    let now = repo.current_date()?;
    let card = Flashcard::new(term.trim(), definition.trim());
    repo.add_card(deck_name, &card, now)?;
    println!("Added '{}' to '{}'", term.trim(), deck_name);
    Ok(())
}

/// Runs a study session over the cards due today in one deck.
fn run_review<I>(
    repo: &SqliteRepository,
    deck_name: &str,
    lines: &mut I,
) -> Result<(), Box<dyn std::error::Error>>
where
    I: Iterator<Item = io::Result<String>>,
{
    // The whole session runs on today's simulated study date
    let today = FixedClock(repo.current_date()?);
    let due = repo.due_cards(deck_name, today.now())?;
    if due.is_empty() {
        println!("Nothing due in '{}' today.", deck_name);
        return Ok(());
    }

    let mut session = ReviewSession::new(deck_name, due);
    println!("{}", session.round_banner());
    let mut last_round = session.round();

    loop {
        let Some(card) = session.current_card() else { break };
        let term = card.term.clone();
        let definition = card.definition.clone();
        let category = card.category.clone();

        println!();
        if let Some(category) = category {
            println!("  [{}]", category);
        }
        println!("  Term: {}", term);
        print!("  (press Enter to reveal) ");
        io::stdout().flush()?;
        if lines.next().is_none() {
            return Ok(());
        }
        println!("  Definition: {}", definition);

        let rating = loop {
            print!("  Grade 0-5 (0 = blackout, 3 = easy, 5 = perfect): ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else { return Ok(()) };
            let input = line?;
            let quality = match input.trim().parse::<u8>() {
                Ok(quality) => quality,
                Err(_) => {
                    println!("  Enter a number from 0 to 5");
                    continue;
                }
            };
            match session.grade_current_card(repo, quality, today.now()) {
                Ok(rating) => break rating,
                Err(err) => println!("  {}", err),
            }
        };
        println!("  Marked {}.", rating.label());

        if session.round() != last_round {
            last_round = session.round();
            println!();
            println!("{}", session.round_banner());
        }
    }

    println!();
    println!("Session complete: {} cards studied.", session.total_count());
    Ok(())
}

fn seed_sample_deck(repo: &SqliteRepository) -> Result<(), Box<dyn std::error::Error>> {
    repo.create_deck("Biology")?;
    let now = repo.current_date()?;

    let cards = [
        Flashcard::new("mitochondrion", "organelle that produces ATP").with_category("cells"),
        Flashcard::new("ribosome", "site of protein synthesis").with_category("cells"),
        Flashcard::new("osmosis", "diffusion of water across a membrane"),
    ];
    for card in &cards {
        repo.add_card("Biology", card, now)?;
    }

    println!("Sample data created!");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  decks                         list decks with due counts");
    println!("  add <deck> <term> = <def>     add a card (deck created on first use)");
    println!("  review <deck>                 study the cards due today");
    println!("  advance                       move the study date one day forward");
    println!("  export <deck> <path>          write a deck to a JSON file");
    println!("  import <path>                 load a deck from a JSON file");
    println!("  quit");
}
