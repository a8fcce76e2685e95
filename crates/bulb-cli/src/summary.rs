use bulb_core::pipeline::config::ExposureConfig;
use bulb_core::pipeline::ExposureSummary;
use console::Style;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_header(config: &ExposureConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Bulb Exposure"));
    println!(
        "  {}",
        s.title.apply_to(
            "\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"
        )
    );
    println!();

    println!(
        "  {:<10}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<10}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<10}{}",
        s.label.apply_to("Step"),
        s.value.apply_to(config.step)
    );
    println!();
}

pub fn print_exposure_summary(result: &ExposureSummary) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<10}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(result.frames_seen)
    );
    if result.frames_absent > 0 {
        println!(
            "  {:<10}{}",
            s.label.apply_to("Absent"),
            s.value.apply_to(result.frames_absent)
        );
    }
    println!(
        "  {:<10}{}",
        s.label.apply_to("Merged"),
        s.value.apply_to(result.frames_merged)
    );
    println!(
        "  {:<10}{}",
        s.label.apply_to("Saved"),
        s.path.apply_to(result.output.display())
    );
    println!();
}
