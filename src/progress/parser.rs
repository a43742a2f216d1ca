// 診断出力行のパーセンテージ解析

/// `"53.23%"` のような行を `0.5323` に変換する
///
/// 末尾が `%` でも数値として読めない行は `None`（通常の診断テキスト扱い）。
pub fn parse_percentage(line: &str) -> Option<f64> {
    let number = line.trim().strip_suffix('%')?.trim_end();
    let percent: f64 = number.parse().ok()?;
    if !percent.is_finite() {
        return None;
    }
    Some((percent / 100.0).clamp(0.0, 1.0))
}
