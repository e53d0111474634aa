use crate::infra::{load_engines, parse_answer, InMemoryAlertPublisher, InMemorySessionRepository};
use clap::Args;
use mindcare::config::AppConfig;
use mindcare::error::AppError;
use mindcare::triage::{
    crisis_resources, AnswerSet, ClassificationResult, QuestionId, Questionnaire, ScoreResult,
    SupportService, EMERGENCY_NUMBER,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Message to classify
    #[arg(required = true, num_args = 1..)]
    pub(crate) text: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Use the full nine-item PHQ-9 instead of the configured questionnaire
    #[arg(long)]
    pub(crate) full: bool,
    /// Answer as QUESTION=VALUE, e.g. q1=2 (repeat for each question)
    #[arg(long = "answer", value_parser = parse_answer)]
    pub(crate) answers: Vec<(QuestionId, u32)>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ChatArgs {
    /// Reply immediately instead of waiting the configured typing delay
    #[arg(long)]
    pub(crate) no_delay: bool,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engines = load_engines(&config.triage)?;

    let text = args.text.join(" ");
    let result = engines.classifier.classify(&text);
    println!("Category: {}", result.category);
    if let Some(keyword) = &result.matched_keyword {
        println!("Matched keyword: {keyword}");
    }
    println!("\n{}", result.reply);
    if result.is_crisis {
        print_crisis_resources();
    }
    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut engines = load_engines(&config.triage)?;
    if args.full {
        engines = engines.with_questionnaire(Questionnaire::phq9());
    }

    if args.answers.is_empty() {
        print_questionnaire(&engines.questionnaire);
        return Ok(());
    }

    let answers: AnswerSet = args.answers.into_iter().collect();
    let result = engines
        .scoring
        .score(engines.questionnaire.questions(), &answers)?;
    print_score(&result);
    Ok(())
}

pub(crate) async fn run_chat(args: ChatArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engines = load_engines(&config.triage)?;
    let delay = if args.no_delay {
        std::time::Duration::ZERO
    } else {
        config.triage.typing_delay()
    };

    let service = SupportService::new(
        Arc::new(InMemorySessionRepository::default()),
        Arc::new(InMemoryAlertPublisher::default()),
        engines,
    );
    let session = service.start_chat()?;
    for message in session.messages() {
        println!("MindCare: {}", message.content);
    }
    println!("(type /quit to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text == "/quit" {
            break;
        }
        if text.is_empty() {
            continue;
        }

        let pending = service.accept_message(session.id(), text)?;
        if !delay.is_zero() {
            println!("MindCare is typing...");
            tokio::time::sleep(delay).await;
        }
        let exchange = service.deliver_reply(session.id(), &pending)?;
        println!("MindCare: {}", exchange.reply.content);
        if exchange.classification.is_crisis {
            print_crisis_resources();
        }
    }

    println!("Take care. Support is available 24/7 at 988.");
    Ok(())
}

pub(crate) fn print_questionnaire(questionnaire: &Questionnaire) {
    println!("{}", questionnaire.title());
    println!("{}\n", questionnaire.instructions());
    for question in questionnaire.questions() {
        println!("[{}] {}", question.id, question.prompt);
        for option in &question.options {
            println!("    {} = {}", option.value, option.label);
        }
    }
    println!("\nAnswer with --answer <id>=<value> for every question.");
}

pub(crate) fn print_score(result: &ScoreResult) {
    let interpretation = result.interpretation();
    println!("Score: {}/{}", result.total, result.max_total);
    println!("{}: {}", interpretation.label, interpretation.description);
    if result.recommend_to_seek_help {
        println!(
            "Consider speaking with a mental health professional. Your campus counseling center can provide support."
        );
    }
}

pub(crate) fn print_crisis_resources() {
    println!("\nIf you are in immediate danger, call {EMERGENCY_NUMBER}.");
    for resource in crisis_resources() {
        println!(
            "  {} ({}): {} [{}]",
            resource.name,
            resource.available,
            resource.phone,
            resource.dial_uri()
        );
    }
}

pub(crate) fn describe(result: &ClassificationResult) -> String {
    let marker = if result.is_crisis { " [crisis]" } else { "" };
    format!("{}{marker}", result.category)
}
