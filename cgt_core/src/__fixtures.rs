use crate::MapResolver;

pub(crate) const RUN_FUNCTION_TEMPLATE: &str = r"int run(int argc, char* argv[])
{
    Options options;
    if ([[[readHelpOpts]]])
    {
        printHelp();
        return 0;
    }
[[[IF hasInfoOpts]]]
    if ([[[readInfoOpts]]])
    {
        printInfo();
        return 0;
    }
[[[ENDIF]]]
[[[IF hasArgs]]]
    [[[readArgs]]]
[[[ENDIF]]]

    return execute(options);
}";

pub(crate) fn run_function_resolver() -> MapResolver {
	MapResolver::new()
		.with("hasInfoOpts", true)
		.with("readInfoOpts", ["a &&", "b &&", "c"])
		.with("readHelpOpts", "x ||\n  y")
		.with("hasArgs", false)
		.with(
			"readArgs",
			["options.input = argv[1];", "options.output = argv[2];"],
		)
}

pub(crate) fn lines(text: &str) -> Vec<String> {
	text.split('\n').map(ToString::to_string).collect()
}
