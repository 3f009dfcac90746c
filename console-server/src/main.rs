use console_core::classify::{self, ClassifierConfig};
use console_core::intake::IntakeController;
use console_server::routes::{console_router, AppState};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() {
    let intake = Arc::new(Mutex::new(IntakeController::new()));
    let (classify_tx, classify_rx) = std::sync::mpsc::channel::<console_core::intake::ClassificationRequest>();
    let (store_tx, store_rx) = std::sync::mpsc::channel::<console_core::incidents::Incident>();

    let classifier = ClassifierConfig::from_env();
    if classifier.is_none() {
        eprintln!("classifier not configured; intake runs manual-only");
    }

    let intake_for_worker = intake.clone();
    std::thread::spawn(move || {
        while let Ok(request) = classify_rx.recv() {
            let result = classifier
                .as_ref()
                .and_then(|config| classify::analyze_report(config, &request.narrative));
            if let Ok(mut intake) = intake_for_worker.lock() {
                intake.apply_classification(request.generation, result);
            }
        }
    });

    // Stand-in for the external incident store collaborator.
    std::thread::spawn(move || {
        while let Ok(incident) = store_rx.recv() {
            match serde_json::to_string(&incident) {
                Ok(json) => println!("DISPATCH {json}"),
                Err(_) => eprintln!("DISPATCH {} (unserializable)", incident.id),
            }
        }
    });

    let app = console_router(AppState {
        intake,
        classify_tx,
        store_tx,
    });
    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("bind :8080");

    println!("console-server listening on :8080");
    axum::serve(listener, app).await.expect("serve");
}
