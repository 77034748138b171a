#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use stm_routes_viewer::StmRoutesApp;

fn main() -> std::io::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        stm_routes_viewer::native_main("STM Routes Viewer", |cc| {
            Box::new(StmRoutesApp::new(cc))
        })
        .await;
    });
    Ok(())
}
