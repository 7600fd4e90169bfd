/// The twelve report sections, in the order the model is asked to emit
/// them. Valuation and technicals explicitly exclude absolute prices so
/// the report stays useful despite the model's knowledge cutoff.
pub const SECTION_TITLES: [&str; 12] = [
    "기업 개요",
    "CEO",
    "주주 구성",
    "사업 비중",
    "산업 전망",
    "경쟁 구도",
    "경제적 해자",
    "리스크 요인",
    "재무 현황",
    "밸류에이션 (가격 수치 제외)",
    "기술적 분석 (가격 수치 제외)",
    "최종 결론",
];

/// Builds the analyst prompt for a subject. The template is fixed; only
/// the subject is interpolated.
pub fn build_prompt(subject: &str) -> String {
    let toc = SECTION_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {}", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "주식 애널리스트로서 '{subject}'에 대한 '1페이지 핵심 요약 보고서'를 작성하라.\n\n\
        **[디자인 및 형식 규칙 - 엄수]**\n\
        1. **목차 제목:** 모든 12개 목차 앞에는 반드시 '### ' (헤더3)를 붙여라.\n\
        2. **본문:** 무조건 '불렛 포인트(•)' 리스트로 작성하라.\n\
        3. **어조:** \"~함\", \"~임\" 체로 간결하게.\n\n\
        **[필수 목차 (12개)]**\n\
        {toc}\n"
    )
}
