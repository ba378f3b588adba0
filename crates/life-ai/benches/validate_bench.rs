use criterion::{black_box, criterion_group, criterion_main, Criterion};
use life_core::Category;

const SCENARIO: &str = r#"Sure, here is a scenario {with braces} in prose.
```json
{
  "title": "An unexpected inheritance that changes the shape of everything",
  "description": "A distant relative left you a small fortune { and a mystery }.",
  "context": "You were never close to them.",
  "choices": [
    {"text": "Invest it all in index funds for the long haul", "description": "Slow and steady.",
     "riskLevel": "low", "potentialOutcomes": ["Growth", "Boredom", "Security", "Extra"], "category": "money"},
    {"text": "Travel the world", "riskLevel": "extreme", "category": "life"},
    {"text": "Start a bakery", "riskLevel": "high", "potentialOutcomes": "?", "category": "career"},
    {"text": "Give it away"}
  ]
}
```
Let me know if you want more!"#;

const OUTCOME: &str = r#"{"title":"Bakery opens","statChanges":[
  {"stat":"money","change":-35,"reason":"Rent"},{"stat":"happiness","change":10},
  {"stat":"career","change":"12"}],"impact":"positive","yearsToAdvance":"3"}"#;

fn bench_validate(c: &mut Criterion) {
    c.bench_function("parse scenario with prose", |b| {
        b.iter(|| life_ai::validate::parse_scenario(black_box(SCENARIO)).unwrap())
    });
    c.bench_function("parse outcome", |b| {
        b.iter(|| life_ai::validate::parse_outcome(black_box(OUTCOME), Category::Career).unwrap())
    });
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);
