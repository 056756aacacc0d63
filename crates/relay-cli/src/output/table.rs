/// Layout knobs for table rendering.
#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 4;
const GAP: &str = "  ";

/// Render aligned string rows under a header line.
#[must_use]
pub fn render_rows(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths = headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(MIN_COLUMN)
                .max(MIN_COLUMN)
        })
        .collect::<Vec<_>>();
    shrink_to(&mut widths, options.max_width);

    let header_line = join_cells(headers.iter().copied(), &widths);
    let mut lines = vec![header_line.clone(), "-".repeat(header_line.chars().count())];
    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(column, _)| row.get(column).map_or("-", String::as_str));
        let line = join_cells(cells, &widths);
        lines.push(if options.color { highlight(&line, row) } else { line });
    }
    lines.join("\n")
}

/// Shrink the widest columns until the row fits the terminal.
fn shrink_to(widths: &mut [usize], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    while widths.iter().sum::<usize>() + gaps > max_width {
        let Some(widest) = widths.iter_mut().max() else {
            return;
        };
        if *widest <= MIN_COLUMN {
            return;
        }
        *widest -= 1;
    }
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = *width))
        .collect::<Vec<_>>()
        .join(GAP)
        .trim_end()
        .to_string()
}

/// Cut to `width` chars, marking the cut with `~`.
fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    let mut cut = single_line
        .chars()
        .take(width.saturating_sub(1))
        .collect::<String>();
    cut.push('~');
    cut
}

/// Dim rows for messages that are still streaming, bold rows that failed.
fn highlight(line: &str, row: &[String]) -> String {
    if row.iter().any(|cell| cell == "streaming") {
        format!("\x1b[2m{line}\x1b[0m")
    } else if row.iter().any(|cell| cell == "failed" || cell == "error") {
        format!("\x1b[1;31m{line}\x1b[0m")
    } else {
        line.to_string()
    }
}
