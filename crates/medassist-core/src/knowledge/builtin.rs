//! Built-in topic table, in match-priority order.

pub(super) const BUILTIN_TOPICS: [(&str, &str); 2] = [
    (
        "flu",
        "Common flu symptoms include:
- Fever or feeling feverish/chills
- Cough and sore throat
- Runny or stuffy nose
- Muscle or body aches
- Headaches
- Fatigue (tiredness)
- Some people may have vomiting and diarrhea",
    ),
    (
        "fever",
        "Common fever symptoms include:
- Elevated body temperature (above 98.6°F/37°C)
- Chills and shivering
- Sweating
- Headache
- Muscle aches
- Loss of appetite
- Dehydration
- Weakness and fatigue",
    ),
];
