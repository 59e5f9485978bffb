//! Bundled example programs

use clap::ValueEnum;

/// Example programs that can be loaded into the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Example {
    BubbleSort,
}

impl Example {
    pub fn title(self) -> &'static str {
        match self {
            Example::BubbleSort => "Bubble Sort",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Example::BubbleSort => BUBBLE_SORT,
        }
    }
}

const BUBBLE_SORT: &str = r#"// Bubble Sort example
const list = [9, 7, 5, 3, 1, 8, 6, 4, 2, 0]; // Example list

// Bubble Sort with visualization
async function bubbleSort() {
    for (let i = 0; i < list.length - 1; i++) {
        for (let j = 0; j < list.length - i - 1; j++) {
            // Highlight the current elements being compared
            await highlightElement(j);
            await highlightElement(j + 1);

            // Compare and swap if necessary
            if (list[j] > list[j + 1]) {
                const temp = list[j];
                list[j] = list[j + 1];
                list[j + 1] = temp;

                // Update the array data in the visualizer
                await updateArrayData(list);
            }
        }
    }
}

// Run the bubble sort function with visualization
await bubbleSort();
"#;
