//! Server-rendered HTML pages.
//!
//! Everything taken from a lecture record is HTML-escaped except the
//! detailed notes, which the model is asked to write as HTML. Those are
//! passed through an allow-list sanitizer instead, since the model reads
//! untrusted transcripts.

use crate::store::LectureRecord;
use crate::study::{DoubtPoint, Mcq};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const STYLE: &str = r#"<style>
  :root { --accent: #667eea; --accent-dark: #764ba2; --text-light: #64748b; }
  * { box-sizing: border-box; }
  body { font-family: system-ui, -apple-system, "Segoe UI", sans-serif; margin: 0; color: #1e293b; background: #f8fafc; line-height: 1.6; }
  header { background: linear-gradient(135deg, var(--accent), var(--accent-dark)); color: white; padding: 24px 32px; }
  header a { color: white; text-decoration: none; }
  main { max-width: 960px; margin: 0 auto; padding: 24px; }
  section { background: white; border-radius: 12px; padding: 20px 24px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
  h2 { margin-top: 0; }
  .meta { color: var(--text-light); font-size: .9rem; }
  .url-form { display: flex; gap: 12px; }
  .url-form input { flex: 1; padding: 12px; border: 1px solid #cbd5e1; border-radius: 8px; font-size: 1rem; }
  .btn { background: var(--accent); color: white; border: none; border-radius: 8px; padding: 12px 20px; font-size: 1rem; cursor: pointer; }
  .btn:disabled { opacity: .6; cursor: wait; }
  .status { margin-top: 12px; min-height: 1.5em; }
  .status.error { color: #dc2626; }
  .revision-point { padding: 6px 10px; border-left: 3px solid var(--accent); margin-bottom: 6px; background: #f1f5f9; }
  .doubt { border-left: 4px solid #ef4444; padding: 10px 14px; margin-bottom: 12px; background: #fef2f2; border-radius: 6px; }
  .confidence { display: inline-block; background: #fef3c7; padding: 2px 8px; border-radius: 12px; font-size: .85rem; }
  .mcq { border: 1px solid #e2e8f0; border-radius: 8px; padding: 14px; margin-bottom: 14px; }
  .mcq ol { list-style: upper-alpha; padding-left: 24px; }
  .mcq li { margin-bottom: 6px; }
  .mcq-option { width: 100%; text-align: left; background: #f8fafc; border: 1px solid #cbd5e1; border-radius: 6px; padding: 8px 12px; font-size: 1rem; cursor: pointer; }
  .mcq-option:hover:enabled { border-color: var(--accent); }
  .mcq-option:disabled { cursor: default; }
  .mcq-option.correct { background: #dcfce7; border-color: #16a34a; }
  .mcq-option.incorrect { background: #fee2e2; border-color: #dc2626; }
  .mcq-feedback { font-weight: 600; }
  .mcq .answer { color: #059669; font-weight: 600; }
  .notice { color: var(--text-light); font-style: italic; }
</style>"#;

const HOME_SCRIPT: &str = r#"<script>
  const form = document.getElementById("processForm");
  const input = document.getElementById("videoUrl");
  const button = document.getElementById("processBtn");
  const status = document.getElementById("status");

  form.addEventListener("submit", async (event) => {
    event.preventDefault();
    const url = input.value.trim();
    status.className = "status";
    if (!url) {
      status.textContent = "Please paste a video URL first.";
      status.className = "status error";
      return;
    }
    button.disabled = true;
    status.textContent = "Fetching transcript and generating notes. This can take a minute...";
    try {
      const response = await fetch("/process", {
        method: "POST",
        headers: { "Content-Type": "application/json", "Accept": "application/json" },
        body: JSON.stringify({ url })
      });
      const data = await response.json();
      if (response.ok && data.success) {
        status.textContent = "Done! Redirecting...";
        window.location.href = data.redirect;
        return;
      }
      status.textContent = data.error || "Processing failed.";
      status.className = "status error";
    } catch (err) {
      status.textContent = "Network error. Please try again.";
      status.className = "status error";
    }
    button.disabled = false;
  });
</script>"#;

const NOTES_SCRIPT: &str = r#"<script>
  document.addEventListener("click", (event) => {
    const option = event.target.closest(".mcq-option");
    if (!option) return;
    const card = option.closest(".mcq");
    if (card.dataset.answered) return;
    card.dataset.answered = "true";

    const correct = option.dataset.correct === "true";
    card.querySelectorAll(".mcq-option").forEach((o) => {
      o.disabled = true;
      if (o.dataset.correct === "true") o.classList.add("correct");
    });
    if (!correct) option.classList.add("incorrect");

    const feedback = card.querySelector(".mcq-feedback");
    feedback.textContent = correct ? "Correct!" : "Not quite.";
    card.querySelector(".mcq-explanation").hidden = false;
  });
</script>"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n{}\n</head>\n<body>\n\
         <header><h1><a href=\"/\">LectureMind</a></h1></header>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        encode_text(title),
        STYLE,
        body
    )
}

/// Landing page with the URL form.
pub fn render_home() -> String {
    let body = format!(
        r#"<section>
  <h2>Turn a lecture video into study notes</h2>
  <p>Paste a YouTube link. LectureMind reads the captions (or the title when there are none) and writes detailed notes, revision points, likely doubts and a practice quiz.</p>
  <form id="processForm" class="url-form">
    <input id="videoUrl" type="url" placeholder="https://www.youtube.com/watch?v=..." autocomplete="off">
    <button id="processBtn" class="btn" type="submit">Generate Notes</button>
  </form>
  <div id="status" class="status"></div>
</section>
{}"#,
        HOME_SCRIPT
    );
    page("LectureMind", &body)
}

/// Notes page for a stored lecture.
pub fn render_notes(record: &LectureRecord) -> String {
    let analysis = &record.analysis;
    let mut body = String::new();

    let _ = write!(
        body,
        "<section>\n<h2>{}</h2>\n<p class=\"meta\">Generated {} from the video {} &middot; \
         <a href=\"https://www.youtube.com/watch?v={}\">watch</a> &middot; \
         <a href=\"/export/{}\">export JSON</a></p>\n",
        encode_text(&record.title),
        record.created_at.format("%Y-%m-%d %H:%M UTC"),
        record.text_source,
        encode_double_quoted_attribute(&record.video_id),
        encode_double_quoted_attribute(&record.id),
    );
    if !record.fallbacks.is_empty() {
        body.push_str(
            "<p class=\"notice\">Some sources were unavailable, so parts of this page use placeholder content.</p>\n",
        );
    }
    body.push_str("</section>\n");

    let _ = write!(
        body,
        "<section id=\"detailed\">\n<h2>Detailed Notes</h2>\n<div>{}</div>\n</section>\n",
        ammonia::clean(&analysis.detailed_notes)
    );

    body.push_str("<section id=\"revision\">\n<h2>Revision Notes</h2>\n");
    let points: Vec<&str> = analysis
        .revision_notes
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if points.is_empty() {
        body.push_str("<p class=\"notice\">No revision notes available.</p>\n");
    }
    for point in points {
        let _ = writeln!(body, "<div class=\"revision-point\">{}</div>", encode_text(point));
    }
    body.push_str("</section>\n");

    push_list(
        &mut body,
        "concepts",
        "Key Concepts",
        &analysis.key_concepts,
        "No key concepts identified.",
        "ul",
    );
    push_list(
        &mut body,
        "questions",
        "Important Questions",
        &analysis.important_questions,
        "No questions generated for this lecture.",
        "ol",
    );

    body.push_str("<section id=\"doubts\">\n<h2>Doubt Points</h2>\n");
    if analysis.doubt_points.is_empty() {
        body.push_str("<p class=\"notice\">No confusion points were identified in this lecture.</p>\n");
    }
    for doubt in &analysis.doubt_points {
        push_doubt(&mut body, doubt);
    }
    body.push_str("</section>\n");

    let mcqs = &record.mcqs.mcqs;
    let _ = writeln!(
        body,
        "<section id=\"mcqs\">\n<h2>Practice MCQs ({} {})</h2>",
        mcqs.len(),
        if mcqs.len() == 1 { "question" } else { "questions" }
    );
    if mcqs.is_empty() {
        body.push_str("<p class=\"notice\">No practice questions available for this lecture.</p>\n");
    }
    for (i, mcq) in mcqs.iter().enumerate() {
        push_mcq(&mut body, i + 1, mcq);
    }
    body.push_str("</section>\n");
    if !mcqs.is_empty() {
        body.push_str(NOTES_SCRIPT);
    }

    page(&format!("{} - LectureMind", record.title), &body)
}

fn push_list(body: &mut String, id: &str, heading: &str, items: &[String], empty: &str, tag: &str) {
    let _ = writeln!(body, "<section id=\"{}\">\n<h2>{}</h2>", id, heading);
    if items.is_empty() {
        let _ = writeln!(body, "<p class=\"notice\">{}</p>", empty);
    } else {
        let _ = writeln!(body, "<{}>", tag);
        for item in items {
            let _ = writeln!(body, "<li>{}</li>", encode_text(item));
        }
        let _ = writeln!(body, "</{}>", tag);
    }
    body.push_str("</section>\n");
}

fn push_doubt(body: &mut String, doubt: &DoubtPoint) {
    let timestamp: &str = if doubt.timestamp.is_empty() { "--:--" } else { &doubt.timestamp };
    let _ = writeln!(
        body,
        "<div class=\"doubt\"><strong>{} &mdash; {}</strong>\n<p>{}</p>\n\
         <span class=\"confidence\">{}% of students find this confusing</span></div>",
        encode_text(timestamp),
        encode_text(&doubt.concept),
        encode_text(&doubt.explanation),
        doubt.confidence
    );
}

fn push_mcq(body: &mut String, number: usize, mcq: &Mcq) {
    let _ = writeln!(
        body,
        "<div class=\"mcq\">\n<h3>Q{}: {}</h3>\n<ol>",
        number,
        encode_text(&mcq.question)
    );
    let correct = mcq.correct_index();
    for (i, option) in mcq.options.iter().enumerate() {
        let _ = writeln!(
            body,
            "<li><button type=\"button\" class=\"mcq-option\" data-correct=\"{}\">{}</button></li>",
            correct == Some(i),
            encode_text(option)
        );
    }
    body.push_str("</ol>\n<p class=\"mcq-feedback\"></p>\n");
    let _ = writeln!(
        body,
        "<div class=\"mcq-explanation\" hidden>\n<p class=\"answer\">Answer: {}</p>\n<p>{}</p>\n</div>\n</div>",
        encode_text(&mcq.correct),
        encode_text(&mcq.explanation)
    );
}
