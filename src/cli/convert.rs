use super::ui;
use crate::core::{Conversion, ConversionRequest, RateSource};
use anyhow::Result;

impl Conversion {
    fn format_result(&self) -> String {
        format!("{:.*}", self.request.round_digits as usize, self.rounded)
    }

    /// One-line confirmation followed by the rate table provenance.
    pub fn display_line(&self) -> String {
        let request = &self.request;
        let mut output = format!(
            "{} {} = {} {}",
            request.amount,
            request.from,
            ui::style_text(&self.format_result(), ui::StyleType::Value),
            ui::style_text(&request.to, ui::StyleType::Label),
        );
        output.push('\n');
        output.push_str(&ui::style_text(
            &format!("Rates base: {} · Updated: {}", self.rates_base, self.updated),
            ui::StyleType::Subtle,
        ));
        output
    }

    pub fn display_as_table(&self) -> String {
        let request = &self.request;
        let mut table = ui::new_styled_table();

        table.add_row(vec![
            ui::label_cell("Amount"),
            ui::value_cell(format!("{} {}", request.amount, request.from)),
        ]);
        table.add_row(vec![
            ui::label_cell("Converted to"),
            ui::highlight_cell(format!("{} {}", self.format_result(), request.to)),
        ]);
        table.add_row(vec![
            ui::label_cell("Rate"),
            ui::value_cell(format!("1 {} = {:.6} {}", request.from, self.rate, request.to)),
        ]);
        table.add_row(vec![
            ui::label_cell("Rates base"),
            ui::value_cell(self.rates_base.clone()),
        ]);
        table.add_row(vec![
            ui::label_cell("Updated"),
            ui::value_cell(self.updated.clone()),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Conversion", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output
    }
}

/// Fetches the rate table for `base`, converts `request` and prints the outcome.
pub async fn run(
    source: &(dyn RateSource + Send + Sync),
    request: ConversionRequest,
    base: &str,
    details: bool,
) -> Result<Conversion> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let table = source.fetch_rates(base).await;
    pb.finish_and_clear();

    let conversion = Conversion::from_table(request, &table?)?;

    if details {
        println!("{}", conversion.display_as_table());
    } else {
        println!("{}", conversion.display_line());
    }

    Ok(conversion)
}
