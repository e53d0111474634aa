use crate::console::{describe, print_crisis_resources, print_score};
use crate::infra::{InMemoryAlertPublisher, InMemorySessionRepository};
use clap::Args;
use mindcare::error::AppError;
use mindcare::triage::{AssessmentStep, Questionnaire, SupportService, TriageEngines};
use std::sync::Arc;

const SCRIPTED_MESSAGES: [&str; 5] = [
    "Hi, I just wanted to talk to someone",
    "I have three exams next week and can't focus on studying",
    "I keep feeling anxious and my heart races at night",
    "Honestly I've been sad and lonely since moving here",
    "Sometimes I think everyone would be better off if I could just die",
];

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Walk the full nine-item PHQ-9 instead of the three-item screener
    #[arg(long)]
    pub(crate) full: bool,
    /// Skip the assessment portion of the demo
    #[arg(long)]
    pub(crate) skip_assessment: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        full,
        skip_assessment,
    } = args;

    let mut engines = TriageEngines::standard();
    if full {
        engines = engines.with_questionnaire(Questionnaire::phq9());
    }
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let service = SupportService::new(
        Arc::new(InMemorySessionRepository::default()),
        alerts.clone(),
        engines,
    );

    println!("MindCare companion demo");
    let session = service.start_chat()?;
    println!("\nChat session {}", session.id());
    for message in session.messages() {
        println!("  MindCare: {}", message.content);
    }

    for text in SCRIPTED_MESSAGES {
        let exchange = service.send_message(session.id(), text)?;
        println!("\n  Student: {text}");
        println!("  -> {}", describe(&exchange.classification));
        println!("  MindCare: {}", exchange.reply.content);
        if exchange.classification.is_crisis {
            print_crisis_resources();
        }
    }
    println!("\nCrisis alerts raised: {}", alerts.events().len());

    if skip_assessment {
        return Ok(());
    }

    let assessment = service.start_assessment()?;
    println!(
        "\n{} ({} questions)",
        assessment.questionnaire().title(),
        assessment.questionnaire().len()
    );

    let questions = assessment.questionnaire().questions().to_vec();
    for (index, question) in questions.iter().enumerate() {
        let value = (index as u32 % 3) + 1;
        let value = value.min(question.max_value());
        service.answer(assessment.id(), &question.id, value)?;
        println!(
            "  [{}%] {} -> {}",
            service.assessment(assessment.id())?.progress_percent(),
            question.prompt,
            question.option_label(value).unwrap_or("?")
        );

        let (_, step) = service.advance(assessment.id())?;
        if let AssessmentStep::Completed(result) = step {
            println!();
            print_score(&result);
        }
    }

    Ok(())
}
