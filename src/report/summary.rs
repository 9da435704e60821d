//! Console summaries of cross-validation and evaluation results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::model::{score_summary, Evaluation};

/// Print per-fold cross-validation accuracies with mean and spread.
pub fn print_cv_table(scores: &[f64]) {
    println!();
    println!(
        "    {} {}",
        style("🔄").cyan(),
        style("CROSS-VALIDATION").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Fold").add_attribute(Attribute::Bold),
        Cell::new("Accuracy").add_attribute(Attribute::Bold),
    ]);

    for (fold, score) in scores.iter().enumerate() {
        table.add_row(vec![
            Cell::new(fold + 1),
            Cell::new(format!("{:.4}", score)),
        ]);
    }

    let (mean, std) = score_summary(scores);
    table.add_row(vec![
        Cell::new("Mean").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.4} (±{:.4})", mean, std))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the confusion matrix, rows=actual, columns=predicted.
pub fn print_confusion_matrix(evaluation: &Evaluation) {
    println!();
    println!(
        "    {} {}",
        style("🧮").cyan(),
        style("CONFUSION MATRIX").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let cm = &evaluation.confusion;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Actual \\ Predicted").add_attribute(Attribute::Bold),
        Cell::new("CANCELED").add_attribute(Attribute::Bold),
        Cell::new("FINISHED").add_attribute(Attribute::Bold),
        Cell::new("Total").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("CANCELED").add_attribute(Attribute::Bold),
        Cell::new(cm[0][0]).fg(Color::Green),
        Cell::new(cm[0][1]).fg(Color::Red),
        Cell::new(cm[0][0] + cm[0][1]),
    ]);
    table.add_row(vec![
        Cell::new("FINISHED").add_attribute(Attribute::Bold),
        Cell::new(cm[1][0]).fg(Color::Red),
        Cell::new(cm[1][1]).fg(Color::Green),
        Cell::new(cm[1][0] + cm[1][1]),
    ]);
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(cm[0][0] + cm[1][0]),
        Cell::new(cm[0][1] + cm[1][1]),
        Cell::new(cm.iter().flatten().sum::<usize>()),
    ]);

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the final human-readable result block with metrics as percentages.
pub fn print_final_summary(evaluation: &Evaluation) {
    println!();
    println!(
        "    {} {}",
        style("🏆").cyan(),
        style("FINAL RESULT").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
    println!(
        "      Accuracy:  {}",
        style(format!("{:.2}%", evaluation.accuracy * 100.0))
            .green()
            .bold()
    );
    println!(
        "      AUC-ROC:   {}",
        style(format!("{:.2}%", evaluation.roc_auc * 100.0))
            .green()
            .bold()
    );
    println!();
    println!("      {}:", style("CANCELED").yellow().bold());
    println!(
        "        Precision: {}",
        style(format!("{:.2}%", evaluation.precision_canceled * 100.0)).yellow()
    );
    println!(
        "        Recall:    {}",
        style(format!("{:.2}%", evaluation.recall_canceled * 100.0)).yellow()
    );
    println!(
        "        F1-Score:  {}",
        style(format!("{:.2}%", evaluation.f1_canceled * 100.0)).yellow()
    );
}
