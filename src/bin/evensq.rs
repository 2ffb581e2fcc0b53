//! evensq — sum of the squares of the even numbers in a list

use clap::{Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use textlabel::even_squares::{
    Breakdown, CUSTOM_CASE, Command as LineCommand, DEMO_CASES, WALKTHROUGH_CASES,
};

/// Even-squares calculator
#[derive(Parser)]
#[command(name = "evensq")]
#[command(version)]
#[command(about = "Sum of the squares of the even numbers in a list")]
struct Args {
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy)]
enum Mode {
    /// Enter comma-separated lists at a prompt
    Interactive,
    /// Show the result for a few fixed lists
    Demo,
    /// Show every step of the calculation for fixed lists and a custom one
    Walkthrough,
}

const SEPARATOR_WIDTH: usize = 40;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mode = match args.command {
        Some(mode) => mode,
        None => select_mode()?,
    };

    match mode {
        Mode::Interactive => interactive()?,
        Mode::Demo => demo(),
        Mode::Walkthrough => walkthrough(),
    }
    Ok(())
}

fn select_mode() -> Result<Mode, dialoguer::Error> {
    let modes = [Mode::Interactive, Mode::Demo, Mode::Walkthrough];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a mode")
        .items(&["Interactive input", "Demo", "Walkthrough"])
        .default(0)
        .interact()?;
    Ok(modes[selection])
}

fn interactive() -> Result<(), dialoguer::Error> {
    let theme = ColorfulTheme::default();
    println!("=== even-squares calculator ===");
    println!("Enter comma-separated integers (e.g. 1,2,3,4,5)");
    println!("Type 'quit' or 'exit' to leave");
    println!("{}", "-".repeat(SEPARATOR_WIDTH));

    loop {
        let line = Input::<String>::with_theme(&theme)
            .with_prompt("Numbers")
            .allow_empty(true)
            .interact_text()?;

        match LineCommand::from_line(&line) {
            Ok(LineCommand::Quit) => {
                println!("Goodbye!");
                return Ok(());
            }
            Ok(LineCommand::Empty) => println!("Enter at least one number."),
            Ok(LineCommand::Numbers(numbers)) => {
                println!();
                println!("{}", Breakdown::new(&numbers));
                println!("{}", "-".repeat(SEPARATOR_WIDTH));
            }
            Err(e) => println!("error: {e}"),
        }
    }
}

fn demo() {
    println!("=== demo ===");
    for (i, numbers) in DEMO_CASES.iter().enumerate() {
        let breakdown = Breakdown::new(numbers);
        println!();
        println!("case {}:", i + 1);
        println!("   input:  {:?}", breakdown.input);
        println!("   evens:  {:?}", breakdown.evens);
        println!("   result: {}", breakdown.sum);
    }
}

fn walkthrough() {
    println!("=== even-squares walkthrough ===");
    println!();
    for (i, numbers) in WALKTHROUGH_CASES.iter().enumerate() {
        println!("case {}:", i + 1);
        print_steps(numbers);
        println!();
    }

    println!("custom case:");
    print_steps(CUSTOM_CASE);
}

fn print_steps(numbers: &[i64]) {
    let breakdown = Breakdown::new(numbers);
    println!("{breakdown}");
    if let Some(calculation) = breakdown.calculation() {
        println!("   steps:   {calculation}");
    }
    println!("{}", "-".repeat(SEPARATOR_WIDTH + 10));
}
