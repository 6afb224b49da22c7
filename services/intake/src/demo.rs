use crate::infra::{describe_outcome, render_form, TerminalNavigator};
use clap::Args;
use mthamini::config::{ApiConfig, AppConfig};
use mthamini::error::AppError;
use mthamini::guarantor::{
    stub_router, CancellationToken, DocumentRef, FieldValue, FormContext, FormId,
    GuarantorEntry, GuarantorField, GuarantorFormSession, GuarantorFormView,
    HttpGuarantorGateway, InMemoryGuarantorStore, SubmitOptions,
};
use mthamini::telemetry;
use tracing::info;

const SAMPLE_GUARANTORS: [(&str, &str); 4] = [
    ("Amani", "Mwakyusa"),
    ("Subira", "Komba"),
    ("Tumaini", "Ngowi"),
    ("Faraji", "Shirima"),
];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of sample guarantors to enter (1-4)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub(crate) guarantors: u8,
    /// Form id of the sample onboarding application
    #[arg(long, default_value = "demo-form")]
    pub(crate) form_id: String,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = InMemoryGuarantorStore::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let backend = tokio::spawn(async move { axum::serve(listener, stub_router(store)).await });
    info!(%addr, "demo backend listening");

    let api = ApiConfig {
        base_url: format!("http://{addr}"),
        ..config.api.clone()
    };
    let gateway = HttpGuarantorGateway::new(&api)?;
    let options = SubmitOptions::from_config(&api);
    let navigator = TerminalNavigator;
    let cancel = CancellationToken::never();

    let count = usize::from(args.guarantors);
    let mut entries: Vec<GuarantorEntry> = SAMPLE_GUARANTORS
        .iter()
        .take(count)
        .map(|(first, last)| sample_entry(first, last))
        .collect();
    // Hold back the last letter so the first attempt fails validation.
    let withheld = entries.last_mut().and_then(|entry| entry.letter_file.take());

    let mut session = GuarantorFormSession::with_entries(
        FormContext::new(FormId::new(args.form_id)),
        config.wizard.clone(),
        entries,
    );

    println!("== Attempt 1: incomplete form");
    let outcome = session.submit(&gateway, &navigator, &options, &cancel).await;
    render_form(&GuarantorFormView::from_session(&session));
    println!("{}", describe_outcome(&outcome));

    println!();
    println!("== Attempt 2: letter attached");
    if let Some(letter) = withheld {
        session.dismiss_error();
        if let Err(err) = session.update_entry(
            count - 1,
            GuarantorField::LetterFile,
            FieldValue::document(letter),
        ) {
            println!("could not attach letter: {err}");
        }
    }
    let outcome = session.submit(&gateway, &navigator, &options, &cancel).await;
    render_form(&GuarantorFormView::from_session(&session));
    println!("{}", describe_outcome(&outcome));

    println!();
    println!("== Attempt 3: a second application reusing a guarantor");
    let (first, last) = SAMPLE_GUARANTORS[0];
    let mut repeat = GuarantorFormSession::with_entries(
        FormContext::default(),
        config.wizard.clone(),
        vec![sample_entry(first, last)],
    );
    let outcome = repeat.submit(&gateway, &navigator, &options, &cancel).await;
    render_form(&GuarantorFormView::from_session(&repeat));
    println!("{}", describe_outcome(&outcome));

    backend.abort();
    Ok(())
}

fn sample_entry(first_name: &str, last_name: &str) -> GuarantorEntry {
    let stem = first_name.to_lowercase();
    GuarantorEntry {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{stem}.{}@example.org", last_name.to_lowercase()),
        phone: "+255700123456".to_string(),
        national_id_front: Some(sample_document(&format!("{stem}-id-front.jpg"), "image/jpeg")),
        national_id_back: Some(sample_document(&format!("{stem}-id-back.jpg"), "image/jpeg")),
        letter_file: Some(sample_document(
            &format!("{stem}-letter.pdf"),
            "application/pdf",
        )),
    }
}

fn sample_document(file_name: &str, mime_type: &str) -> DocumentRef {
    DocumentRef::new(
        file_name,
        mime_type,
        format!("sample {mime_type} for {file_name}").into_bytes(),
    )
}
