use equations_rs::{Definitions, Evaluator};

fn main() {
    pretty_env_logger::init();

    let text = "\
size = 50; // viewBox size
center = size / 2
radius = center - stroke // circle radius
stroke = 2
// stroke = 4; // thicker outline
ring = radius ^ 2 - (radius - stroke) ^ 2
spiral = turns * 2
turns = spiral / 2
offset = margin + 1
";

    let definitions = Definitions::parse(text).expect("Failed to parse definitions");
    let mut table = definitions.to_table().expect("Invalid definitions");

    let mut evaluator = Evaluator::new(100);
    let report = evaluator.evaluate_all(&mut table);

    for definition in &definitions {
        let feedback = report
            .feedback(&definition.name)
            .unwrap_or_else(|| "(disabled)".to_string());
        println!("{:<40} {}", definition.to_string(), feedback);
    }
}
