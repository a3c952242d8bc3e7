use amedas::{extract_first_table, pages_for_range, Granularity};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

// A daily page: two header rows and one row per day of the month.
fn daily_page() -> String {
    let mut html = String::from(
        r#"<html><body><table id="tablefix1">
<tr><th rowspan="2">日</th><th colspan="2">気圧(hPa)</th><th colspan="3">降水量(mm)</th><th colspan="3">気温(℃)</th></tr>
<tr><th>現地</th><th>海面</th><th>合計</th><th>最大1時間</th><th>最大10分間</th><th>平均</th><th>最高</th><th>最低</th></tr>
"#,
    );
    for day in 1..=31 {
        html.push_str(&format!(
            "<tr><td>{}</td><td>1012.{}</td><td>1015.{}</td><td>--</td><td>--</td><td>--</td><td>{}.4</td><td>{}.9</td><td>{}.1</td></tr>\n",
            day,
            day % 10,
            day % 7,
            day % 12,
            day % 12 + 5,
            day % 12 - 3
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn bench_amedas(c: &mut Criterion) {
    let html = daily_page();
    c.bench_function("extract_first_table", |b| {
        b.iter(|| extract_first_table(black_box(&html)))
    });

    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    c.bench_function("pages_for_range_hourly", |b| {
        b.iter(|| pages_for_range(black_box(Granularity::Hourly), black_box(start), black_box(end)))
    });
}

criterion_group!(benches, bench_amedas);
criterion_main!(benches);
