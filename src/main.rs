// main.rs — desktop host: window, scroll page, input, egui panels and the walkthrough frame loop

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod renderer;
mod sun_textures;

use renderer::Renderer;
use sun_textures::{SunImage, SunTextures};
use walkthrough_viewer::config::find_asset;
use walkthrough_viewer::i18n::{self, tr, tr_with};
use walkthrough_viewer::model::{build_demo_house, load_model_file};
use walkthrough_viewer::scene::Scene;
use walkthrough_viewer::scroll::ScrollRegion;
use walkthrough_viewer::{Walkthrough, WalkthroughConfig};

use glam::Vec2;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

const ORBIT_RAD_PER_PX: f32 = 0.005;
/// Pointer travel below this counts as a click rather than a drag.
const CLICK_SLOP_PX: f64 = 4.0;
const DEMO_HOUSE_SIZE: (f32, f32, f32) = (12.0, 9.0, 3.0);

/// Host-side state the egui panels read and edit.
struct HostUi {
    show_fps: bool,
    fps: f32,
    is_fullscreen: bool,
    current_lang: String,
    model_error: Option<String>,
    next_model: Option<PathBuf>,
    exit_requested: bool,
    textures_loaded: usize,
    textures_total: usize,
    marker_pos: Option<egui::Pos2>,
}

fn model_path_from_args() -> Option<PathBuf> {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--model" {
            return it.next().map(PathBuf::from);
        }
    }
    None
}

fn demo_house() -> Scene {
    let (w, d, h) = DEMO_HOUSE_SIZE;
    build_demo_house(w, d, h)
}

fn initial_scene() -> Scene {
    let Some(path) = model_path_from_args().or_else(|| find_asset("model.json")) else {
        log::info!("No model file found, using the demo house");
        return demo_house();
    };

    match load_model_file(&path) {
        Ok(scene) => {
            log::info!("Loaded model {}", path.display());
            scene
        }
        Err(e) => {
            log::error!("{e}; using the demo house");
            demo_house()
        }
    }
}

fn open_model(path: &Path, walkthrough: &mut Walkthrough, region: &mut ScrollRegion, ui: &mut HostUi) {
    match load_model_file(path) {
        Ok(scene) => {
            log::info!("Loaded model {}", path.display());
            walkthrough.load_scene(scene);
            region.scroll_to_start();
            ui.model_error = None;
        }
        Err(e) => {
            log::error!("{e}");
            ui.model_error = Some(e.to_string());
        }
    }
}

fn pick_model_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&tr("file.filter.model"), &["json"])
        .pick_file()
}

fn set_fullscreen(window: &Window, ui: &mut HostUi, fullscreen: bool) {
    ui.is_fullscreen = fullscreen;
    if fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

fn logical_height(window: &Window) -> f32 {
    window
        .inner_size()
        .to_logical::<f32>(window.scale_factor())
        .height
}

/// Screen position of the entrance marker in egui points, offset included.
fn marker_screen_pos(walkthrough: &Walkthrough, renderer: &Renderer, window: &Window) -> Option<egui::Pos2> {
    let anchor = walkthrough.marker_position()?;
    let pose = walkthrough.pose();
    let far = pose.radius * 4.0 + 100.0;
    let ndc = pose.project(walkthrough.target(), renderer.aspect(), far, anchor)?;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
        return None;
    }

    let scale = window.scale_factor() as f32;
    let w = renderer.size.width as f32 / scale;
    let h = renderer.size.height as f32 / scale;
    let [ox, oy] = walkthrough.config().marker.offset_px;
    Some(egui::pos2(
        (ndc.x + 1.0) * 0.5 * w + ox,
        (1.0 - ndc.y) * 0.5 * h + oy,
    ))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let current_lang = i18n::resolve_lang_from_args();
    i18n::init(current_lang.clone());

    let config = WalkthroughConfig::load();
    let page_height = config.page.height_px;
    let wheel_line_px = config.page.wheel_line_px;

    let event_loop = EventLoop::new();
    let window = match WindowBuilder::new()
        .with_title(tr("app.title"))
        .with_inner_size(LogicalSize::new(1280, 720))
        .build(&event_loop)
    {
        Ok(w) => Arc::new(w),
        Err(e) => {
            log::error!("Failed to create window: {e}");
            return;
        }
    };

    let mut renderer = match pollster::block_on(Renderer::new(window.clone())) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    let mut walkthrough = Walkthrough::new(config);
    walkthrough.load_scene(initial_scene());
    let mut region = ScrollRegion::new(page_height, logical_height(&window));

    // pointer state
    let mut mouse_pressed = false;
    let mut dragged = false;
    let mut press_pos: Option<PhysicalPosition<f64>> = None;
    let mut last_mouse_pos: Option<PhysicalPosition<f64>> = None;

    let mut last_frame_time = Instant::now();
    let mut frame_count = 0;

    let mut ui_state = HostUi {
        show_fps: false,
        fps: 0.0,
        is_fullscreen: false,
        current_lang,
        model_error: None,
        next_model: None,
        exit_requested: false,
        textures_loaded: 0,
        textures_total: walkthrough.time_samples(),
        marker_pos: None,
    };

    let (tx, rx): (Sender<SunImage>, Receiver<SunImage>) = channel();
    let mut sun_textures = SunTextures::new(walkthrough.time_samples());
    let mut uploaded_sun: Option<usize> = None;
    sun_textures::start_loading(walkthrough.time_samples(), tx);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        while let Ok(sun) = rx.try_recv() {
            sun_textures.insert(sun);
            ui_state.textures_loaded = sun_textures.loaded();
        }

        match event {
            Event::WindowEvent { event, .. } => {
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        region.set_viewport_height(logical_height(&window));
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::O) => {
                                    if let Some(path) = pick_model_file() {
                                        open_model(&path, &mut walkthrough, &mut region, &mut ui_state);
                                    }
                                }
                                Some(VirtualKeyCode::F11) => {
                                    let fullscreen = !ui_state.is_fullscreen;
                                    set_fullscreen(&window, &mut ui_state, fullscreen);
                                }
                                Some(VirtualKeyCode::T) => walkthrough.toggle(Instant::now()),
                                Some(VirtualKeyCode::F) => {
                                    walkthrough.cycle_furniture();
                                }
                                Some(VirtualKeyCode::Left) => {
                                    let index = walkthrough.time_index();
                                    if index > 0 {
                                        walkthrough.select_time_index(index - 1);
                                    }
                                }
                                Some(VirtualKeyCode::Right) => {
                                    walkthrough.select_time_index(walkthrough.time_index() + 1);
                                }
                                Some(VirtualKeyCode::Home) => {
                                    region.scroll_to_start();
                                    walkthrough.register_interaction(Instant::now());
                                }
                                Some(VirtualKeyCode::End) => {
                                    region.scroll_to_end();
                                    walkthrough.register_interaction(Instant::now());
                                }
                                _ => {}
                            }
                        }
                    }

                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            mouse_pressed = state == ElementState::Pressed;
                            if mouse_pressed {
                                dragged = false;
                                press_pos = last_mouse_pos;
                                walkthrough.register_interaction(Instant::now());
                            } else {
                                if !dragged {
                                    if let Some(pos) = last_mouse_pos {
                                        let w = renderer.size.width.max(1) as f64;
                                        let h = renderer.size.height.max(1) as f64;
                                        let ndc = Vec2::new(
                                            (pos.x / w * 2.0 - 1.0) as f32,
                                            (1.0 - pos.y / h * 2.0) as f32,
                                        );
                                        if let Some(node) =
                                            walkthrough.pick_at(ndc, renderer.aspect(), Instant::now())
                                        {
                                            log::debug!("Picked node {node:?}");
                                        }
                                    }
                                }
                                press_pos = None;
                            }
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        if mouse_pressed {
                            if press_pos.is_none() {
                                press_pos = Some(position);
                            }
                            if let (Some(start), false) = (press_pos, dragged) {
                                let (dx, dy) = (position.x - start.x, position.y - start.y);
                                dragged = dx.hypot(dy) > CLICK_SLOP_PX;
                            }
                            if let (Some(last), true) = (last_mouse_pos, dragged) {
                                let dx = (position.x - last.x) as f32;
                                walkthrough.orbit(-dx * ORBIT_RAD_PER_PX, Instant::now());
                            }
                        }
                        last_mouse_pos = Some(position);
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let pixels = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y * wheel_line_px,
                            MouseScrollDelta::PixelDelta(pos) => {
                                pos.to_logical::<f32>(window.scale_factor()).y
                            }
                        };
                        region.scroll_by(-pixels);
                        walkthrough.register_interaction(Instant::now());
                    }

                    WindowEvent::DroppedFile(path) => {
                        open_model(&path, &mut walkthrough, &mut region, &mut ui_state);
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                frame_count += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(last_frame_time).as_secs_f32();
                if elapsed >= 1.0 {
                    ui_state.fps = frame_count as f32 / elapsed;
                    frame_count = 0;
                    last_frame_time = now;
                }

                walkthrough.update(region.progress(), now);

                let index = walkthrough.time_index();
                if uploaded_sun != Some(index) {
                    if let Some(img) = sun_textures.get(index) {
                        renderer.load_sun_texture(img);
                        uploaded_sun = Some(index);
                    }
                }

                renderer.update_frame(&walkthrough);
                ui_state.marker_pos = marker_screen_pos(&walkthrough, &renderer, &window);

                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(ctx, &mut walkthrough, &mut region, &mut ui_state, &window);
                });

                if let Some(path) = ui_state.next_model.take() {
                    open_model(&path, &mut walkthrough, &mut region, &mut ui_state);
                }
                if ui_state.exit_requested {
                    *control_flow = ControlFlow::Exit;
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::warn!("Render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn draw_ui(
    ctx: &egui::Context,
    walkthrough: &mut Walkthrough,
    region: &mut ScrollRegion,
    state: &mut HostUi,
    window: &Window,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_model")).clicked() {
                    ui.close_menu();
                    state.next_model = pick_model_file();
                }
                if ui.button(tr("menu.exit")).clicked() {
                    state.exit_requested = true;
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                if ui.button(tr("view.reset")).clicked() {
                    walkthrough.reset();
                    region.scroll_to_start();
                    ui.close_menu();
                }

                let label = if state.is_fullscreen {
                    tr("view.fullscreen.exit")
                } else {
                    tr("view.fullscreen.enter")
                };
                if ui.button(label).clicked() {
                    let fullscreen = !state.is_fullscreen;
                    set_fullscreen(window, state, fullscreen);
                    ui.close_menu();
                }

                ui.separator();
                if ui.checkbox(&mut state.show_fps, tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                let langs: [(&str, &str); 2] = [("en", "English"), ("zh-Hans", "简体中文")];
                for (code, name) in langs {
                    if ui
                        .radio_value(&mut state.current_lang, code.to_string(), name)
                        .clicked()
                    {
                        i18n::init(state.current_lang.clone());
                        window.set_title(&tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::SidePanel::right("controls").show(ctx, |ui| {
        ui.heading(tr("panel.title"));
        ui.separator();

        if ui.button(tr("panel.toggle_interior")).clicked() {
            walkthrough.toggle(Instant::now());
        }

        if ui.button(tr("panel.cycle_furniture")).clicked() {
            walkthrough.cycle_furniture();
        }
        ui.label(match walkthrough.furniture_selection() {
            Some(i) => tr_with("panel.furniture_set", &[("n", (i + 1).to_string())]),
            None => tr("panel.furniture_none"),
        });

        ui.separator();
        ui.label(tr("panel.time"));
        let mut index = walkthrough.time_index();
        let last = walkthrough.time_samples().saturating_sub(1);
        if ui
            .add(egui::Slider::new(&mut index, 0..=last).show_value(false))
            .changed()
        {
            walkthrough.select_time_index(index);
        }
        ui.label(walkthrough.time_label());

        ui.separator();
        ui.label(tr("panel.progress"));
        let mut progress = region.progress();
        if ui
            .add(egui::Slider::new(&mut progress, 0.0..=1.0).fixed_decimals(2))
            .changed()
        {
            region.scroll_to_progress(progress);
            walkthrough.register_interaction(Instant::now());
        }
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if state.textures_loaded < state.textures_total {
                ui.label(
                    egui::RichText::new(tr_with(
                        "status.loading_textures",
                        &[
                            ("done", state.textures_loaded.to_string()),
                            ("total", state.textures_total.to_string()),
                        ],
                    ))
                    .color(egui::Color32::YELLOW),
                );
                ui.label("|");
            }
            if let Some(err) = &state.model_error {
                ui.label(
                    egui::RichText::new(tr_with("status.model_error", &[("err", err.clone())]))
                        .color(egui::Color32::RED),
                );
                ui.label("|");
            }

            let pose = walkthrough.pose();
            ui.label(tr_with(
                "status.progress",
                &[("value", format!("{:.0}", walkthrough.progress() * 100.0))],
            ));
            ui.label("|");
            ui.label(if walkthrough.is_ortho_view() {
                tr("status.mode.ortho")
            } else {
                tr("status.mode.perspective")
            });
            ui.label("|");
            ui.label(tr_with("status.quadrant", &[("q", walkthrough.quadrant().to_string())]));
            ui.label("|");
            ui.label(format!("α: {:.1}°", pose.alpha.to_degrees()));
            ui.label("|");
            ui.label(format!("FOV: {:.2}°", pose.fov.to_degrees()));
            ui.label("|");
            ui.label(format!("R: {:.1}", pose.radius));

            if walkthrough.toggle_mode() {
                ui.label("|");
                ui.label(tr("status.interior"));
            }
            if walkthrough.is_idle_rotating() {
                ui.label("|");
                ui.label(tr("status.idle"));
            }

            if state.show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", state.fps)).color(egui::Color32::GREEN),
                );
            }
        });
    });

    if let Some(pos) = state.marker_pos {
        egui::Area::new("entrance_marker")
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(tr("marker.entrance"))
                        .color(egui::Color32::WHITE)
                        .background_color(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 200)),
                );
            });
    }
}
