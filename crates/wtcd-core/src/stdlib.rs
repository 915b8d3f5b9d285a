/// Names of every native function visible to documents, grouped by library.
pub const STD_FUNCTION_NAMES: &[&str] = &[
    // content
    "contentAddParagraph",
    "contentAddImage",
    "contentAddUnorderedList",
    "contentAddOrderedList",
    "contentAddHeader",
    "contentAddTable",
    "contentAddHorizontalRule",
    // debug
    "print",
    "assert",
    "assertError",
    "timeStart",
    "timeEnd",
    // list
    "listSet",
    "listForEach",
    "listMap",
    "listCreateFilled",
    "listChunk",
    "listFilter",
    "listSplice",
    "listSlice",
    "listLength",
    "listIndexOf",
    "listIncludes",
    "listFindIndex",
    // math
    "mathMin",
    "mathMax",
    "mathFloor",
    "mathCeil",
    // random
    "random",
    "randomInt",
    "randomBoolean",
    "randomBiased",
    // reader
    "readerSetPinned",
    "readerUnsetPinned",
    "readerSetStateDesc",
    "readerUnsetStateDesc",
    // string
    "stringLength",
    "stringFormatNumberFixed",
    "stringFormatNumberPrecision",
    "stringSplit",
    "stringSubByLength",
    "stringSubByIndex",
    // canvas
    "canvasCreate",
    "canvasOutput",
    "canvasClear",
    "canvasPutImage",
    "canvasPutImagePart",
    "canvasSetFont",
    "canvasSetFillStyle",
    "canvasFillText",
    "canvasFillRect",
    "canvasSetStrokeStyle",
    "canvasSetLineWidth",
    "canvasStrokeText",
];

#[cfg(test)]
mod stdlib_tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn std_function_names_are_unique() {
        let unique: BTreeSet<_> = STD_FUNCTION_NAMES.iter().collect();
        assert_eq!(unique.len(), STD_FUNCTION_NAMES.len());
    }
}
