use std::path::PathBuf;

use dicom_slice_viewer::{
    DicomBackend, DisplayElement, Message, PaintOutcome, SliceSet, SortBy, Viewer, ViewerConfig,
    ViewerSession,
};

const ELEMENT: DisplayElement = DisplayElement {
    id: 1,
    width: 512,
    height: 512,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init()
        .ok();

    let mut args = std::env::args().skip(1);
    let directory = args.next().map_or_else(|| PathBuf::from("dicom"), PathBuf::from);
    let output = args.next().unwrap_or_else(|| "result.png".to_owned());

    let slices = SliceSet::from_directory(&directory, SortBy::NumericName)
        .expect("should have found slices in directory");
    let middle = slices.len() / 2;

    let mut viewer = Viewer::new(ViewerConfig::default());
    let _ = viewer
        .initialize(Some(ELEMENT), async { Ok(DicomBackend::default()) })
        .await;

    let (session, commands, mut events) = ViewerSession::new(viewer);
    let session = tokio::spawn(session.run());

    commands
        .send(Message::SetSlices(slices))
        .expect("session should be running");
    commands
        .send(Message::GoTo(middle))
        .expect("session should be running");
    drop(commands);

    while let Some(event) = events.recv().await {
        match event.outcome {
            Some(PaintOutcome::Painted { index, .. }) => log::info!("Painted slice {}", index + 1),
            Some(PaintOutcome::Failed(err)) => log::error!("{err}"),
            _ => {}
        }
    }

    let viewer = session.await.expect("session should have finished");
    let image = viewer
        .backend()
        .and_then(|backend| backend.snapshot(&ELEMENT))
        .expect("should have painted the middle slice");
    image.save(&output).expect("should have saved image");
    log::info!("Saved slice {} to {output}", middle + 1);
}
