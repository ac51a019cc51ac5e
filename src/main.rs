mod app;
mod cloud;
mod transform;

lib_app::app_main!(app::Viewer);
