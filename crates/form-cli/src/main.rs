use clap::{Parser, Subcommand, ValueEnum};
use form_spec::{
    AnswerMap, FormSpec, RuleSet, ValidationResult, answers_from_value, build_render_payload,
    lint, render_json_ui, render_text, should_show, validate,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Offline helpers for conditional forms",
    long_about = "Evaluates visibility rules, validates submissions, renders forms, and lints form definitions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a rule set against a set of answers.
    Check {
        /// JSON file holding the rule set (`null` means no rules).
        #[arg(long, value_name = "RULES")]
        rules: PathBuf,
        /// JSON file holding the answers collected so far.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Validate a submission and print the Airtable field mapping.
    Validate {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the submitted answers JSON.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Render the questions visible for the given answers.
    Render {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing the answers collected so far.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Report structural problems in a form definition.
    Lint {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Print the JSON schema of a form definition.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { rules, answers } => run_check(rules, answers),
        Command::Validate { form, answers } => run_validate(form, answers),
        Command::Render {
            form,
            answers,
            format,
        } => run_render(form, answers, format),
        Command::Lint { form } => run_lint(form),
        Command::Schema => run_schema(),
    }
}

fn read_form(path: &Path) -> CliResult<FormSpec> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn read_answers(path: &Path) -> CliResult<AnswerMap> {
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    if !value.is_object() {
        return Err(format!("{} must contain a JSON object of answers", path.display()).into());
    }
    Ok(answers_from_value(&value))
}

fn run_check(rules_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let rules_json = fs::read_to_string(rules_path)?;
    let rules: Option<RuleSet> = serde_json::from_str(&rules_json)?;
    let answers = read_answers(&answers_path)?;

    println!("visible: {}", should_show(rules.as_ref(), &answers));
    Ok(())
}

fn run_validate(form_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let spec = read_form(&form_path)?;
    let answers = read_answers(&answers_path)?;

    let result = validate(&spec, &answers);
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result)?;

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) -> CliResult<()> {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!("  {} - {}", error.question_key, error.message);
        }
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Ignored answer fields: {}",
            result.unknown_fields.join(", ")
        );
    }
    if result.valid {
        println!("Airtable fields:");
        println!("{}", serde_json::to_string_pretty(&result.fields)?);
    }
    Ok(())
}

fn run_render(
    form_path: PathBuf,
    answers_path: Option<PathBuf>,
    mode: RenderMode,
) -> CliResult<()> {
    let spec = read_form(&form_path)?;
    let answers = match answers_path {
        Some(path) => read_answers(&path)?,
        None => AnswerMap::new(),
    };

    let payload = build_render_payload(&spec, &answers);
    match mode {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json_ui(&payload))?
        ),
    }
    Ok(())
}

fn run_lint(form_path: PathBuf) -> CliResult<()> {
    let spec = read_form(&form_path)?;
    let issues = lint(&spec);
    if issues.is_empty() {
        println!("No problems found in '{}'.", spec.title);
        return Ok(());
    }

    println!("Problems:");
    for issue in &issues {
        println!("  [{}] {}", issue.code(), issue);
    }
    Err(format!("{} problem(s) found", issues.len()).into())
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(FormSpec);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
