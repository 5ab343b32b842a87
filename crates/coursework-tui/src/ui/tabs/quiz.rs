use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use coursework_core::exercises::{AnswerVerdict, QuizPhase};
use coursework_core::models::Question;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.quiz.phase() {
        QuizPhase::Loading => render_message(frame, area, "Loading questions...", None),
        QuizPhase::Empty => render_message(
            frame,
            area,
            "No questions available",
            Some(app.quiz.load_error().unwrap_or("The quiz is empty.")),
        ),
        QuizPhase::InProgress => render_question(frame, app, area),
        QuizPhase::Complete => render_score(frame, app, area),
        QuizPhase::Reviewing => render_review(frame, app, area),
    }
}

fn quiz_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, detail: Option<&str>) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", message), styles::highlight_style())),
    ];
    if let Some(detail) = detail {
        lines.push(Line::from(Span::styled(
            format!("  {}", detail),
            styles::muted_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[n]", styles::help_key_style()),
            Span::styled(" to try again.", styles::muted_style()),
        ]));
    }
    frame.render_widget(
        Paragraph::new(lines).block(quiz_block(" Quiz ".to_string())),
        area,
    );
}

fn render_question(frame: &mut Frame, app: &App, area: Rect) {
    let Some(question) = app.quiz.current_question() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Length(4), // Question text
            Constraint::Min(4),    // Answers
            Constraint::Length(3), // Result
        ])
        .split(area);

    let gauge = Gauge::default()
        .block(quiz_block(format!(
            " Question {} of {} ",
            app.quiz.current_index() + 1,
            app.quiz.len()
        )))
        .gauge_style(styles::title_style())
        .ratio(app.quiz.progress().clamp(0.0, 1.0))
        .label(format!("Score {}", app.quiz.score()));
    frame.render_widget(gauge, chunks[0]);

    let text = Paragraph::new(Line::from(Span::styled(
        format!(" {}", question.question),
        styles::list_item_style(),
    )))
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
    frame.render_widget(text, chunks[1]);

    let selected = app.quiz.selected();
    let items: Vec<ListItem> = question
        .answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            let style = match selected {
                Some(_) if question.is_correct(i) => styles::correct_style(),
                Some(choice) if choice == i => styles::incorrect_style(),
                Some(_) => styles::muted_style(),
                None if i == app.quiz_selection => styles::selected_style(),
                None => styles::list_item_style(),
            };
            let marker = if selected.is_none() && i == app.quiz_selection {
                "▶"
            } else {
                " "
            };
            ListItem::new(Line::from(format!(" {} {}. {}", marker, i + 1, answer))).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title(" Answers ")
            .borders(Borders::ALL)
            .border_style(styles::border_style(selected.is_none())),
    );
    frame.render_widget(list, chunks[2]);

    let result = match selected {
        Some(choice) if question.is_correct(choice) => {
            Line::from(Span::styled(" Correct!", styles::correct_style()))
        }
        Some(_) => Line::from(vec![
            Span::styled(" Incorrect. ", styles::incorrect_style()),
            Span::styled(
                format!("The answer is {}", question.correct_answer().unwrap_or("-")),
                styles::muted_style(),
            ),
        ]),
        None => Line::from(Span::styled(
            " Choose an answer and press Enter",
            styles::muted_style(),
        )),
    };
    frame.render_widget(
        Paragraph::new(result).block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false))),
        chunks[3],
    );
}

fn render_score(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Quiz complete!", styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  You scored ", styles::list_item_style()),
            Span::styled(
                format!("{} of {}", app.quiz.score(), app.quiz.len()),
                styles::highlight_style(),
            ),
            Span::styled(
                format!(" ({}%)", app.quiz.percentage()),
                styles::list_item_style(),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [r]", styles::help_key_style()),
            Span::styled(" review answers   ", styles::muted_style()),
            Span::styled("[n]", styles::help_key_style()),
            Span::styled(" play again", styles::muted_style()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(quiz_block(" Results ".to_string())),
        area,
    );
}

fn answer_text(question: &Question, answer: Option<usize>) -> String {
    answer
        .and_then(|i| question.answers.get(i))
        .cloned()
        .unwrap_or_else(|| "No answer".to_string())
}

fn render_review(frame: &mut Frame, app: &App, area: Rect) {
    let Some(question) = app.quiz.review_question() else {
        return;
    };
    let index = app.quiz.review_index();
    let verdict = app.quiz.verdict(index);
    let verdict_style = match verdict {
        AnswerVerdict::Correct => styles::correct_style(),
        AnswerVerdict::Incorrect => styles::incorrect_style(),
        AnswerVerdict::Unanswered => styles::muted_style(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", question.question),
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Your answer:    ", styles::muted_style()),
            Span::styled(answer_text(question, app.quiz.user_answer(index)), verdict_style),
        ]),
        Line::from(vec![
            Span::styled("  Correct answer: ", styles::muted_style()),
            Span::styled(
                question.correct_answer().unwrap_or("-").to_string(),
                styles::correct_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Result:         ", styles::muted_style()),
            Span::styled(verdict.label(), verdict_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ←/→", styles::help_key_style()),
            Span::styled(" previous/next   ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" back to score", styles::muted_style()),
        ]),
    ];

    let title = format!(" Review {} of {} ", index + 1, app.quiz.len());
    let paragraph = Paragraph::new(lines)
        .block(quiz_block(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_text() {
        let q = Question {
            question: "?".into(),
            answers: vec!["a".into(), "b".into()],
            correct: 1,
        };
        assert_eq!(answer_text(&q, Some(0)), "a");
        assert_eq!(answer_text(&q, None), "No answer");
        assert_eq!(answer_text(&q, Some(9)), "No answer");
    }
}
