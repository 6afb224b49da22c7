use mthamini::guarantor::{GuarantorFormView, SubmitOutcome, WizardNavigator, WizardRoute};

/// Navigator for terminal runs: the wizard "moves" by announcing the route.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TerminalNavigator;

impl WizardNavigator for TerminalNavigator {
    fn navigate_to(&self, route: &WizardRoute) {
        println!("Navigating to {route}");
    }
}

pub(crate) fn render_form(view: &GuarantorFormView) {
    println!("{}", view.heading);
    println!("{}", view.subheading);

    for card in &view.cards {
        println!();
        println!("  {}", card.title);
        if card.missing_fields.is_empty() {
            println!("    ready to submit");
        } else {
            let missing: Vec<&str> = card.missing_fields.iter().map(|field| field.label()).collect();
            println!("    missing: {}", missing.join(", "));
        }
        for document in &card.documents {
            println!(
                "    {}: {} ({} bytes)",
                document.field.label(),
                document.file_name,
                document.size
            );
        }
    }

    if let Some(banner) = &view.error_banner {
        println!();
        println!("! {banner}");
    }
    println!();
    println!("[{}]", view.submit.label);
}

pub(crate) fn describe_outcome(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Completed(receipt) => format!(
            "Submitted {} guarantor(s) for form {}",
            receipt.guarantor_count, receipt.confirmed_form_id
        ),
        SubmitOutcome::Failed(err) => format!("Submission failed: {}", err.user_message()),
        SubmitOutcome::AlreadySubmitting => "A submission is already in progress".to_string(),
    }
}
