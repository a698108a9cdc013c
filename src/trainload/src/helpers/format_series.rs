pub trait FormatSeries {
    fn format_series(&self) -> String;
}

impl FormatSeries for f64 {
    fn format_series(&self) -> String {
        format!("{:.2}", self)
    }
}

impl FormatSeries for [f64] {
    fn format_series(&self) -> String {
        let values = self
            .iter()
            .map(|v| v.format_series())
            .collect::<Vec<_>>();
        format!("[{}]", values.join(", "))
    }
}

impl FormatSeries for [bool] {
    fn format_series(&self) -> String {
        self.iter().map(|r| if *r { 'R' } else { '.' }).collect()
    }
}
